use std::any::Any;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use shared::DataPointLogger;

/// Append-only flight log, one message per line. Each line is flushed as it
/// is written so the log survives the process being killed mid-flight.
pub struct FileFlightLog {
    path: PathBuf,
    file: File,
    bytes_logged: u32,
    logging_enabled: bool,
}

impl FileFlightLog {
    pub fn create(path: Option<&Path>) -> std::io::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(Self::default_file_name()),
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file,
            bytes_logged: 0,
            logging_enabled: false,
        })
    }

    pub fn default_file_name() -> String {
        format!(
            "{}-flight-log.txt",
            chrono::Local::now().format("%Y-%m-%d-%H-%M-%S")
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataPointLogger<str> for FileFlightLog {
    fn log_data_point(&mut self, data_point: &str) {
        if !self.logging_enabled {
            return;
        }

        let result = writeln!(self.file, "{}", data_point).and_then(|_| self.file.flush());
        match result {
            Ok(()) => self.bytes_logged += data_point.len() as u32 + 1,
            Err(err) => println!("FileFlightLog: Failed to write {}: {err}", self.path.display()),
        }
    }

    fn get_bytes_logged(&self) -> u32 {
        self.bytes_logged
    }

    fn set_logging_enabled(&mut self, enabled: bool) {
        self.logging_enabled = enabled;
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}
