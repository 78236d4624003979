use alloc::{
    collections::VecDeque,
    string::{String, ToString},
    vec::Vec,
};
use core::any::Any;

use crate::{
    comms_hal::{LinkError, SerialLink},
    fcu_hal::{FcuDriver, OutputChannel, SensorSnapshot, SensorSnapshotProvider},
    logger::DataPointLogger,
    persistence::{PersistentRecord, PersistentStore, StorageError},
};
use strum::EnumCount;

/// Driver with a virtual millisecond clock. `delay_ms` advances the clock
/// instead of blocking, so a whole flight runs instantly under test.
#[derive(Debug)]
pub struct FcuDriverMock {
    timestamp: u64,
    outputs: [bool; OutputChannel::COUNT],
    pub continuities: [bool; OutputChannel::COUNT],
    pub delays: Vec<u32>,
}

impl FcuDriver for FcuDriverMock {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.timestamp += ms as u64;
    }

    fn set_output_channel(&mut self, channel: OutputChannel, state: bool) {
        self.outputs[channel.index()] = state;
    }

    fn get_output_channel(&self, channel: OutputChannel) -> bool {
        self.outputs[channel.index()]
    }

    fn get_output_channel_continuity(&self, channel: OutputChannel) -> bool {
        self.continuities[channel.index()]
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl FcuDriverMock {
    pub fn new() -> Self {
        Self {
            timestamp: 0,
            outputs: [false; OutputChannel::COUNT],
            continuities: [true; OutputChannel::COUNT],
            delays: Vec::new(),
        }
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl Default for FcuDriverMock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct SerialLinkMock {
    inbound: VecDeque<Vec<u8>>,
    pub sent: Vec<String>,
    pub flushes: usize,
}

impl SerialLink for SerialLinkMock {
    fn send_line(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.sent.push(String::from_utf8_lossy(data).to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        self.flushes += 1;
        Ok(())
    }

    fn recv_line(&mut self, data: &mut [u8]) -> Result<Option<usize>, LinkError> {
        let Some(line) = self.inbound.pop_front() else {
            return Ok(None);
        };

        if line.len() > data.len() {
            return Err(LinkError::MessageTooLong);
        }

        data[..line.len()].copy_from_slice(&line);
        Ok(Some(line.len()))
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl SerialLinkMock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_recv_line(&mut self, line: &str) {
        self.inbound.push_back(line.as_bytes().to_vec());
    }

    /// Drains everything sent so far.
    pub fn take_sent(&mut self) -> Vec<String> {
        core::mem::take(&mut self.sent)
    }
}

/// Single-record store backed by RAM. Successful writes are also kept
/// decoded in `writes` so tests can check what was persisted and when.
#[derive(Debug, Default)]
pub struct PersistentStoreMock {
    pub data: Option<Vec<u8>>,
    pub writes: Vec<PersistentRecord>,
    pub fail_io: bool,
}

impl PersistentStore for PersistentStoreMock {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError> {
        if self.fail_io {
            return Err(StorageError::ReadFailed);
        }

        let Some(data) = &self.data else {
            return Ok(0);
        };

        let size = data.len().min(buffer.len());
        buffer[..size].copy_from_slice(&data[..size]);
        Ok(size)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_io {
            return Err(StorageError::WriteFailed);
        }

        if let Some(record) = PersistentRecord::decode(data) {
            self.writes.push(record);
        }
        self.data = Some(data.to_vec());
        Ok(())
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl PersistentStoreMock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: PersistentRecord) -> Self {
        let mut store = Self::new();
        store.data = record.encode().ok().map(|buffer| buffer.to_vec());
        store
    }

    pub fn record(&self) -> Option<PersistentRecord> {
        PersistentRecord::decode(self.data.as_deref()?)
    }
}

#[derive(Debug, Default)]
pub struct FlightLogMock {
    pub lines: Vec<String>,
    pub enabled: bool,
}

impl DataPointLogger<str> for FlightLogMock {
    fn log_data_point(&mut self, data_point: &str) {
        if self.enabled {
            self.lines.push(data_point.to_string());
        }
    }

    fn get_bytes_logged(&self) -> u32 {
        self.lines.iter().map(|line| line.len() as u32 + 1).sum()
    }

    fn set_logging_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl FlightLogMock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
pub struct SensorProviderMock {
    pub snapshot: Option<SensorSnapshot>,
    pub refreshes: usize,
}

impl SensorSnapshotProvider for SensorProviderMock {
    fn refresh(&mut self) -> Option<SensorSnapshot> {
        self.refreshes += 1;
        self.snapshot
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl SensorProviderMock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: SensorSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            refreshes: 0,
        }
    }
}
