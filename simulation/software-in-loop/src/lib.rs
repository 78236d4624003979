pub mod config;
pub mod driver;
pub mod link;
pub mod logging;
pub mod recording;
pub mod sensors;
pub mod storage;

use std::fmt;
use std::io::Write;

use config::SilConfig;
use driver::{FcuDriverSim, OutputEvent};
use link::ScriptedLink;
use logging::FileFlightLog;
use rocket_fcu::sensors::{SensorSource, SensorSourceKind};
use rocket_fcu::Fcu;
use sensors::DisconnectedDrivers;
use shared::fcu_hal::{Phase, SensorSnapshot};
use shared::persistence::{self, PersistentRecord};
use shared::DataPointLogger;
use storage::FileStore;

pub type SilSensors = SensorSource<DisconnectedDrivers, std::vec::IntoIter<Option<SensorSnapshot>>>;

#[derive(Debug)]
pub enum SilError {
    Io(std::io::Error),
    Config(String),
    Recording { line: usize, error: String },
    MissingRecording,
    Unbounded,
}

impl fmt::Display for SilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SilError::Io(err) => write!(f, "io error: {err}"),
            SilError::Config(err) => write!(f, "bad config: {err}"),
            SilError::Recording { line, error } => write!(f, "bad recording at line {line}: {error}"),
            SilError::MissingRecording => write!(f, "replay needs a recording"),
            SilError::Unbounded => write!(f, "live runs need max_ticks"),
        }
    }
}

impl std::error::Error for SilError {}

impl From<std::io::Error> for SilError {
    fn from(err: std::io::Error) -> Self {
        SilError::Io(err)
    }
}

/// What happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SilSummary {
    pub ticks: u64,
    pub final_phase: Phase,
    /// Every confirmed phase change with the simulated time it happened at.
    pub phases: Vec<(u64, Phase)>,
    pub output_events: Vec<OutputEvent>,
    pub bytes_logged: u32,
}

/// Boots a controller against the host stand-ins and runs it until the
/// recording ends or `max_ticks` is reached. Everything the controller sends
/// on its link is written to `out`.
pub fn run(config: &SilConfig, out: Box<dyn Write>) -> Result<SilSummary, SilError> {
    let recording = match (config.source, &config.recording) {
        (SensorSourceKind::Replay, Some(path)) => recording::load_recording(path)?,
        (SensorSourceKind::Replay, None) => return Err(SilError::MissingRecording),
        (SensorSourceKind::Live, _) if config.max_ticks.is_none() => {
            return Err(SilError::Unbounded)
        }
        (SensorSourceKind::Live, _) => Vec::new(),
    };

    let mut store = FileStore::new(&config.store_path);
    apply_record_flags(config, &mut store);

    let mut driver = FcuDriverSim::new(config.realtime);
    for channel in &config.open_channels {
        driver.set_output_channel_continuity(*channel, false);
    }
    let mut link = ScriptedLink::new(config.commands.clone(), out);
    let mut flight_log = FileFlightLog::create(config.log_path.as_deref())?;
    let mut sensors: SilSensors =
        SensorSource::select(config.source, DisconnectedDrivers, recording.into_iter());

    println!("Flight log: {}", flight_log.path().display());

    let mut fcu = Fcu::new(
        config.fcu.clone(),
        &mut driver,
        &mut link,
        &mut flight_log,
        &mut store,
        &mut sensors,
    );

    let mut phases = Vec::new();
    let mut tick = 0;

    while config.max_ticks.map_or(true, |max_ticks| tick < max_ticks) {
        if let Some(link) = fcu.link.as_mut_any().downcast_mut::<ScriptedLink>() {
            link.advance_tick(tick);
        }

        let phase = fcu.phase;
        fcu.update();
        tick += 1;

        if fcu.phase != phase {
            phases.push((fcu.timestamp(), fcu.phase));
        }

        let exhausted = fcu
            .sensors
            .as_mut_any()
            .downcast_mut::<SilSensors>()
            .map_or(false, |sensors| sensors.is_exhausted());
        if exhausted {
            break;
        }

        fcu.driver.delay_ms(config.tick_ms);
    }

    let final_phase = fcu.phase;
    drop(fcu);

    Ok(SilSummary {
        ticks: tick,
        final_phase,
        phases,
        output_events: driver.output_log,
        bytes_logged: flight_log.get_bytes_logged(),
    })
}

fn apply_record_flags(config: &SilConfig, store: &mut FileStore) {
    if config.debug.is_none() && config.ground.is_none() {
        return;
    }

    let mut record = persistence::load(store).unwrap_or(PersistentRecord::default());
    if let Some(debug) = config.debug {
        record.debug = debug;
    }
    if let Some(ground) = config.ground {
        record.ground = ground;
    }

    if let Err(err) = persistence::save(store, &record) {
        println!("Failed to write record flags to {}: {:?}", store.path().display(), err);
    }
}
