use std::path::Path;

use shared::fcu_hal::SensorSnapshot;

use crate::SilError;

/// Reads a recorded flight, one JSON value per line:
///
/// - a bare sensor snapshot,
/// - a telemetry message as sent by the controller (its `sensors` are used),
/// - `null` for a tick where the sensors did not answer.
///
/// Blank lines are skipped.
pub fn load_recording(path: &Path) -> Result<Vec<Option<SensorSnapshot>>, SilError> {
    let contents = std::fs::read_to_string(path)?;
    parse_recording(&contents)
}

pub fn parse_recording(contents: &str) -> Result<Vec<Option<SensorSnapshot>>, SilError> {
    let mut frames = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let frame = parse_frame(line).map_err(|err| SilError::Recording {
            line: index + 1,
            error: err.to_string(),
        })?;
        frames.push(frame);
    }

    Ok(frames)
}

fn parse_frame(line: &str) -> Result<Option<SensorSnapshot>, serde_json::Error> {
    let mut value: serde_json::Value = serde_json::from_str(line)?;

    if value.is_null() {
        return Ok(None);
    }

    if value.get("type").and_then(|kind| kind.as_str()) == Some("telemetry") {
        value = value["sensors"].take();
    }

    serde_json::from_value(value).map(Some)
}
