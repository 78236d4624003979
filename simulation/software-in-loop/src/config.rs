use std::path::{Path, PathBuf};

use rocket_fcu::sensors::SensorSourceKind;
use serde::{Deserialize, Serialize};
use shared::fcu_hal::{FcuConfig, OutputChannel};

use crate::SilError;

/// A raw line written to the controller's inbound link at `tick`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCommand {
    pub tick: u64,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilConfig {
    pub fcu: FcuConfig,
    pub source: SensorSourceKind,
    pub recording: Option<PathBuf>,
    pub commands: Vec<ScriptedCommand>,
    pub log_path: Option<PathBuf>,
    pub store_path: PathBuf,
    /// Sleep for real while the controller waits, instead of only moving the
    /// simulated clock.
    pub realtime: bool,
    pub tick_ms: u32,
    pub max_ticks: Option<u64>,
    /// Channels wired without an igniter, so they read no continuity.
    pub open_channels: Vec<OutputChannel>,
    /// Written into the persistent record before boot when set.
    pub debug: Option<bool>,
    pub ground: Option<bool>,
}

impl Default for SilConfig {
    fn default() -> Self {
        Self {
            fcu: FcuConfig::default(),
            source: SensorSourceKind::Replay,
            recording: None,
            commands: Vec::new(),
            log_path: None,
            store_path: PathBuf::from("fcu-record.bin"),
            realtime: false,
            tick_ms: 10,
            max_ticks: None,
            open_channels: Vec::new(),
            debug: None,
            ground: None,
        }
    }
}

impl SilConfig {
    /// Reads a config file. Relative paths inside it are taken relative to
    /// the file itself.
    pub fn load(path: &Path) -> Result<Self, SilError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: SilConfig =
            serde_json::from_str(&contents).map_err(|err| SilError::Config(err.to_string()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);

        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        if let Some(recording) = self.recording.as_mut() {
            resolve(recording);
        }
        if let Some(log_path) = self.log_path.as_mut() {
            resolve(log_path);
        }
        resolve(&mut self.store_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: SilConfig =
            serde_json::from_str(r#"{ "recording": "flight.jsonl", "fcu": { "main_alt": 300.0 } }"#)
                .unwrap();

        assert_eq!(config.source, SensorSourceKind::Replay);
        assert_eq!(config.recording, Some(PathBuf::from("flight.jsonl")));
        assert_eq!(config.fcu.main_alt, 300.0);
        assert_eq!(config.fcu.comm_count, 10);
        assert_eq!(config.tick_ms, 10);
        assert_eq!(config.max_ticks, None);
        assert!(config.open_channels.is_empty());
    }

    #[test]
    fn test_paths_resolved_against_config_dir() {
        let mut config = SilConfig {
            recording: Some(PathBuf::from("flight.jsonl")),
            log_path: Some(PathBuf::from("/var/log/flight.txt")),
            ..SilConfig::default()
        };
        config.resolve_paths(Path::new("runs/demo"));

        assert_eq!(config.recording, Some(PathBuf::from("runs/demo/flight.jsonl")));
        assert_eq!(config.log_path, Some(PathBuf::from("/var/log/flight.txt")));
        assert_eq!(config.store_path, PathBuf::from("runs/demo/fcu-record.bin"));
    }

    #[test]
    fn test_scripted_commands() {
        let config: SilConfig = serde_json::from_str(
            r#"{ "commands": [ { "tick": 3, "line": "{\"command\":\"arm\"}" } ] }"#,
        )
        .unwrap();

        assert_eq!(
            config.commands,
            vec![ScriptedCommand {
                tick: 3,
                line: String::from("{\"command\":\"arm\"}"),
            }]
        );
    }
}
