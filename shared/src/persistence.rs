use core::any::Any;

use serde::{Deserialize, Serialize};

use crate::fcu_hal::Phase;

// Bump the revision whenever the payload layout changes
pub const RECORD_HEADER: [u8; 8] = *b"MainRev5";
pub const RECORD_PAYLOAD_SIZE: usize = 3;
pub const RECORD_SIZE: usize = RECORD_HEADER.len() + RECORD_PAYLOAD_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    ReadFailed,
    WriteFailed,
    Serialization,
}

/// The only state that survives a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentRecord {
    pub phase: Phase,
    pub debug: bool,
    pub ground: bool,
}

impl PersistentRecord {
    pub const fn default() -> Self {
        Self {
            phase: Phase::Init,
            debug: false,
            ground: false,
        }
    }

    pub fn encode(&self) -> Result<[u8; RECORD_SIZE], StorageError> {
        let mut buffer = [0u8; RECORD_SIZE];
        buffer[..RECORD_HEADER.len()].copy_from_slice(&RECORD_HEADER);

        let payload = postcard::to_slice(self, &mut buffer[RECORD_HEADER.len()..])
            .map_err(|_| StorageError::Serialization)?;

        if payload.len() != RECORD_PAYLOAD_SIZE {
            return Err(StorageError::Serialization);
        }

        Ok(buffer)
    }

    /// Anything without the current header is treated as a blank medium.
    pub fn decode(buffer: &[u8]) -> Option<Self> {
        if buffer.len() < RECORD_SIZE || buffer[..RECORD_HEADER.len()] != RECORD_HEADER {
            return None;
        }

        postcard::from_bytes(&buffer[RECORD_HEADER.len()..RECORD_SIZE]).ok()
    }
}

/// Non-volatile medium holding a single record. A `write` must either land
/// completely or leave the previous record intact.
pub trait PersistentStore {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError>;
    fn write(&mut self, data: &[u8]) -> Result<(), StorageError>;

    fn as_mut_any(&mut self) -> &mut dyn Any;
}

pub fn load(store: &mut dyn PersistentStore) -> Option<PersistentRecord> {
    let mut buffer = [0u8; RECORD_SIZE];
    let size = store.read(&mut buffer).ok()?;

    PersistentRecord::decode(&buffer[..size])
}

pub fn save(store: &mut dyn PersistentStore, record: &PersistentRecord) -> Result<(), StorageError> {
    let buffer = record.encode()?;
    store.write(&buffer)
}
