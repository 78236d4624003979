use alloc::string::String;
use core::any::Any;

use serde::{Deserialize, Serialize};

use crate::fcu_hal::{Command, Phase, SensorSnapshot};

pub const MAX_MESSAGE_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    WriteFailed,
    FlushFailed,
    ReadFailed,
    MessageTooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationError {
    SerdeError,
    MessageTooLong,
    UnexpectedEnd,
    BadEncoding,
    UnknownCommand,
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Io => SerializationError::SerdeError,
            serde_json::error::Category::Syntax => SerializationError::BadEncoding,
            serde_json::error::Category::Data => SerializationError::UnknownCommand,
            serde_json::error::Category::Eof => SerializationError::UnexpectedEnd,
        }
    }
}

/// Everything the vehicle sends. Serialized as one JSON object per line with
/// the variant name in `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Telemetry {
        time: u64,
        state: Phase,
        sensors: SensorSnapshot,
    },
    State {
        time: u64,
        state: Phase,
    },
    Result {
        time: u64,
        pass: bool,
    },
    Error {
        time: u64,
        message: String,
    },
}

impl OutboundMessage {
    pub fn time(&self) -> u64 {
        match self {
            OutboundMessage::Telemetry { time, .. }
            | OutboundMessage::State { time, .. }
            | OutboundMessage::Result { time, .. }
            | OutboundMessage::Error { time, .. } => *time,
        }
    }

    pub fn to_json(&self) -> Result<String, SerializationError> {
        let text = serde_json::to_string(self)?;

        if text.len() > MAX_MESSAGE_SIZE {
            return Err(SerializationError::MessageTooLong);
        }

        Ok(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    pub command: Command,
}

/// Full duplex, line delimited serial channel.
pub trait SerialLink {
    /// Queues one message. The link appends the line terminator.
    fn send_line(&mut self, data: &[u8]) -> Result<(), LinkError>;
    /// Blocks until every queued byte is on the wire.
    fn flush(&mut self) -> Result<(), LinkError>;
    /// Copies the next complete inbound line, without terminator, into `data`.
    fn recv_line(&mut self, data: &mut [u8]) -> Result<Option<usize>, LinkError>;

    fn as_mut_any(&mut self) -> &mut dyn Any;
}
