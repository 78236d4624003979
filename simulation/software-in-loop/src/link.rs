use std::any::Any;
use std::collections::VecDeque;
use std::io::Write;

use shared::comms_hal::{LinkError, SerialLink};

use crate::config::ScriptedCommand;

/// Serial link for the harness. Inbound lines come from a script and are
/// released on the tick they are scheduled for; outbound lines go to `out`.
pub struct ScriptedLink {
    script: VecDeque<ScriptedCommand>,
    ready: VecDeque<String>,
    out: Box<dyn Write>,
    pub lines_sent: usize,
}

impl ScriptedLink {
    pub fn new(mut commands: Vec<ScriptedCommand>, out: Box<dyn Write>) -> Self {
        commands.sort_by_key(|command| command.tick);

        Self {
            script: commands.into(),
            ready: VecDeque::new(),
            out,
            lines_sent: 0,
        }
    }

    /// Makes every line scheduled at or before `tick` available to read.
    pub fn advance_tick(&mut self, tick: u64) {
        while self.script.front().map_or(false, |next| next.tick <= tick) {
            if let Some(command) = self.script.pop_front() {
                self.ready.push_back(command.line);
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.script.len() + self.ready.len()
    }
}

impl SerialLink for ScriptedLink {
    fn send_line(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.out
            .write_all(data)
            .and_then(|_| self.out.write_all(b"\n"))
            .map_err(|_| LinkError::WriteFailed)?;

        self.lines_sent += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        self.out.flush().map_err(|_| LinkError::FlushFailed)
    }

    fn recv_line(&mut self, data: &mut [u8]) -> Result<Option<usize>, LinkError> {
        let Some(line) = self.ready.pop_front() else {
            return Ok(None);
        };

        let line = line.trim_end();
        if line.len() > data.len() {
            return Err(LinkError::MessageTooLong);
        }

        data[..line.len()].copy_from_slice(line.as_bytes());
        Ok(Some(line.len()))
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}
