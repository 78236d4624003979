use std::any::Any;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use shared::persistence::{PersistentStore, StorageError};

/// Persistent record kept in a single file. Writes go to a sibling temp file
/// which is then renamed over the record, so a crash leaves either the old
/// or the new record, never a torn one.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomic(&self, data: &[u8]) -> std::io::Result<()> {
        let temp_path = self.temp_path();

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        fs::rename(&temp_path, &self.path)
    }
}

impl PersistentStore for FileStore {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            // Never written: a blank medium
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => {
                println!("FileStore: Failed to read {}: {err}", self.path.display());
                return Err(StorageError::ReadFailed);
            }
        };

        let size = data.len().min(buffer.len());
        buffer[..size].copy_from_slice(&data[..size]);
        Ok(size)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        self.write_atomic(data).map_err(|err| {
            println!("FileStore: Failed to write {}: {err}", self.path.display());
            StorageError::WriteFailed
        })
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}
