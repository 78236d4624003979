use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rocket_fcu::sensors::SensorSourceKind;
use shared::fcu_hal::{FcuConfig, OutputChannel, Phase, SensorSnapshot};
use shared::persistence::{self, PersistentRecord};
use software_in_loop::config::{ScriptedCommand, SilConfig};
use software_in_loop::driver::OutputEvent;
use software_in_loop::storage::FileStore;
use software_in_loop::{run, SilError};

#[derive(Clone, Default)]
struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedOutput {
    fn messages(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.borrow();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fcu-sil-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn fixture_frame(acc_z: f32, dp: f32, alt: f32) -> SensorSnapshot {
    let mut snapshot = SensorSnapshot::default();
    snapshot.acc.z = acc_z;
    snapshot.bar.pressure = 1013.0;
    snapshot.bar.pressure_rate = dp;
    snapshot.bar.altitude = alt;
    snapshot.bar.ground_altitude = 100.0;
    snapshot
}

fn fixture_flight() -> Vec<Option<SensorSnapshot>> {
    let mut frames = Vec::new();

    // On the pad
    frames.extend((0..30).map(|_| Some(fixture_frame(1.0, 0.0, 100.0))));
    // Motor burn, with one dropped reading
    frames.extend((0..5).map(|i| Some(fixture_frame(5.0, -5.0, 150.0 + 200.0 * i as f32))));
    frames.push(None);
    // Coasting up to apogee
    frames.extend((0..10).map(|i| Some(fixture_frame(-1.0, -0.5, 1200.0 + 250.0 * i as f32))));
    frames.push(Some(fixture_frame(-1.0, 2.0, 3700.0)));
    // Descent under drogue
    frames.extend((0..40).map(|i| Some(fixture_frame(-1.0, 0.5, 3600.0 - 20.0 * i as f32))));
    // Below the main altitude
    frames.extend((0..20).map(|i| Some(fixture_frame(-1.0, 0.5, 1500.0 - 20.0 * i as f32))));

    frames
}

fn fixture_recording(dir: &Path, frames: &[Option<SensorSnapshot>]) -> PathBuf {
    let path = dir.join("flight.jsonl");
    let mut contents = String::new();
    for frame in frames {
        contents.push_str(&serde_json::to_string(frame).unwrap());
        contents.push('\n');
    }
    std::fs::write(&path, contents).unwrap();
    path
}

fn fixture_config(dir: &Path) -> SilConfig {
    SilConfig {
        fcu: FcuConfig {
            parachute_delay_ms: 100,
            ..FcuConfig::default()
        },
        recording: Some(fixture_recording(dir, &fixture_flight())),
        log_path: Some(dir.join("flight-log.txt")),
        store_path: dir.join("fcu-record.bin"),
        ..SilConfig::default()
    }
}

fn command(tick: u64, command: &str) -> ScriptedCommand {
    ScriptedCommand {
        tick,
        line: format!("{{\"command\":\"{}\"}}", command),
    }
}

fn phases(summary: &software_in_loop::SilSummary) -> Vec<Phase> {
    summary.phases.iter().map(|(_, phase)| *phase).collect()
}

fn stored_record(path: &Path) -> Option<PersistentRecord> {
    persistence::load(&mut FileStore::new(path))
}

#[test]
fn replayed_flight_reaches_recovery() {
    let dir = fixture_dir("flight");
    let config = SilConfig {
        commands: vec![command(1, "arm"), command(15, "ignite")],
        ..fixture_config(&dir)
    };
    let output = SharedOutput::default();

    let summary = run(&config, Box::new(output.clone())).unwrap();

    assert_eq!(
        phases(&summary),
        vec![
            Phase::Idle,
            Phase::Arm,
            Phase::Ignite,
            Phase::Burn,
            Phase::Coast,
            Phase::Apogee,
            Phase::Wait,
            Phase::Eject,
            Phase::Fall,
            Phase::Recover,
        ]
    );
    assert_eq!(summary.final_phase, Phase::Recover);
    assert_eq!(summary.ticks, fixture_flight().len() as u64 + 1);

    let outputs: Vec<(OutputChannel, bool)> = summary
        .output_events
        .iter()
        .map(|event: &OutputEvent| (event.channel, event.state))
        .collect();
    assert_eq!(
        outputs,
        vec![
            (OutputChannel::Ignition, true),
            (OutputChannel::Ignition, false),
            (OutputChannel::DrogueCharge, true),
            (OutputChannel::DrogueCharge, false),
            (OutputChannel::MainChute, true),
            (OutputChannel::MainChute, false),
        ]
    );

    let messages = output.messages();
    let states: Vec<&str> = messages
        .iter()
        .filter(|message| message["type"] == "state")
        .filter_map(|message| message["state"].as_str())
        .collect();
    assert_eq!(
        states,
        vec!["idle", "arm", "ignite", "burn", "coast", "apogee", "wait", "eject", "fall", "recover"]
    );
    assert!(messages.iter().any(|message| message["type"] == "telemetry"));

    let log = std::fs::read_to_string(dir.join("flight-log.txt")).unwrap();
    assert_eq!(log.lines().count(), messages.len());
    assert_eq!(summary.bytes_logged as usize, log.len());

    assert_eq!(
        stored_record(&config.store_path).map(|record| record.phase),
        Some(Phase::Recover)
    );
}

#[test]
fn reset_mid_flight_resumes_from_record() {
    let dir = fixture_dir("resume");
    let config = fixture_config(&dir);
    let mut record = PersistentRecord::default();
    record.phase = Phase::Fall;
    persistence::save(&mut FileStore::new(&config.store_path), &record).unwrap();

    let frames = vec![Some(fixture_frame(-1.0, 0.5, 1500.0)); 5];
    let config = SilConfig {
        recording: Some(fixture_recording(&dir, &frames)),
        ..config
    };

    let summary = run(&config, Box::new(std::io::sink())).unwrap();

    assert_eq!(phases(&summary), vec![Phase::Fall, Phase::Recover]);
    assert_eq!(summary.output_events[0].channel, OutputChannel::MainChute);
}

#[test]
fn ground_flag_suppresses_resume() {
    let dir = fixture_dir("ground");
    let config = fixture_config(&dir);
    let mut record = PersistentRecord::default();
    record.phase = Phase::Fall;
    persistence::save(&mut FileStore::new(&config.store_path), &record).unwrap();

    let config = SilConfig {
        ground: Some(true),
        max_ticks: Some(5),
        ..config
    };

    let summary = run(&config, Box::new(std::io::sink())).unwrap();

    assert_eq!(phases(&summary), vec![Phase::Idle]);
    assert!(summary.output_events.is_empty());

    let record = stored_record(&config.store_path).unwrap();
    assert!(record.ground);
    assert_eq!(record.phase, Phase::Idle);
}

#[test]
fn live_source_without_sensors_fails_self_check() {
    let dir = fixture_dir("live");
    let config = SilConfig {
        source: SensorSourceKind::Live,
        recording: None,
        commands: vec![command(1, "test")],
        max_ticks: Some(4),
        ..fixture_config(&dir)
    };
    let output = SharedOutput::default();

    let summary = run(&config, Box::new(output.clone())).unwrap();

    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.final_phase, Phase::Test);

    let messages = output.messages();
    let result = messages
        .iter()
        .find(|message| message["type"] == "result")
        .unwrap();
    assert_eq!(result["pass"], false);
    assert!(!messages.iter().any(|message| message["type"] == "telemetry"));
}

#[test]
fn open_channel_fails_self_check() {
    let dir = fixture_dir("continuity");
    let base = SilConfig {
        commands: vec![command(1, "test")],
        max_ticks: Some(4),
        ..fixture_config(&dir)
    };

    let mut results = Vec::new();
    for open_channels in [vec![], vec![OutputChannel::MainChute]] {
        let config = SilConfig {
            open_channels,
            store_path: dir.join(format!("record-{}.bin", results.len())),
            ..base.clone()
        };
        let output = SharedOutput::default();

        let summary = run(&config, Box::new(output.clone())).unwrap();
        assert_eq!(summary.final_phase, Phase::Test);

        let messages = output.messages();
        let result = messages
            .iter()
            .find(|message| message["type"] == "result")
            .unwrap();
        results.push(result["pass"].clone());
    }

    assert_eq!(results, [true, false]);
}

#[test]
fn unbounded_runs_rejected() {
    let dir = fixture_dir("unbounded");

    let config = SilConfig {
        source: SensorSourceKind::Live,
        ..fixture_config(&dir)
    };
    assert!(matches!(
        run(&config, Box::new(std::io::sink())),
        Err(SilError::Unbounded)
    ));

    let config = SilConfig {
        recording: None,
        ..fixture_config(&dir)
    };
    assert!(matches!(
        run(&config, Box::new(std::io::sink())),
        Err(SilError::MissingRecording)
    ));
}

#[test]
fn config_file_paths_are_relative_to_config() {
    let dir = fixture_dir("config");
    fixture_recording(&dir, &[Some(fixture_frame(1.0, 0.0, 100.0)); 3]);
    let config_path = dir.join("sil.json");
    std::fs::write(
        &config_path,
        r#"{
            "recording": "flight.jsonl",
            "log_path": "flight-log.txt",
            "store_path": "record.bin",
            "fcu": { "comm_delay_ms": 0 }
        }"#,
    )
    .unwrap();

    let config = SilConfig::load(&config_path).unwrap();
    assert_eq!(config.recording, Some(dir.join("flight.jsonl")));
    assert_eq!(config.fcu.comm_delay_ms, 0);

    let summary = run(&config, Box::new(std::io::sink())).unwrap();
    assert_eq!(summary.final_phase, Phase::Idle);
    assert!(dir.join("flight-log.txt").exists());
    assert!(dir.join("record.bin").exists());
}
