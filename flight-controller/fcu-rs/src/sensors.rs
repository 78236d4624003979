use core::any::Any;

use serde::{Deserialize, Serialize};
use shared::fcu_hal::{
    Attitude, Axes, Barometer, GpsFix, SensorSnapshot, SensorSnapshotProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NineDofReading {
    pub gyro: Axes,
    pub acc: Axes,
    pub mag: Axes,
    pub att: Attitude,
}

/// Raw sensor drivers on the board. Each read returns `None` if the device
/// did not answer.
pub trait SensorDrivers {
    fn read_ninedof(&mut self) -> Option<NineDofReading>;
    fn read_barometer(&mut self) -> Option<Barometer>;
    fn read_gps(&mut self) -> Option<GpsFix>;
}

/// Snapshots straight from the hardware. The GPS only produces a fix every
/// few ticks, so a missing fix keeps the previous one instead of failing the
/// whole snapshot.
pub struct LiveSensors<D> {
    drivers: D,
    last_fix: GpsFix,
}

impl<D: SensorDrivers> LiveSensors<D> {
    pub fn new(drivers: D) -> Self {
        Self {
            drivers,
            last_fix: GpsFix::default(),
        }
    }

    pub fn drivers(&mut self) -> &mut D {
        &mut self.drivers
    }
}

impl<D: SensorDrivers + 'static> SensorSnapshotProvider for LiveSensors<D> {
    fn refresh(&mut self) -> Option<SensorSnapshot> {
        let ninedof = self.drivers.read_ninedof()?;
        let bar = self.drivers.read_barometer()?;

        if let Some(fix) = self.drivers.read_gps() {
            self.last_fix = fix;
        }

        Some(SensorSnapshot {
            gyro: ninedof.gyro,
            acc: ninedof.acc,
            mag: ninedof.mag,
            att: ninedof.att,
            bar,
            gps: self.last_fix,
        })
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

/// Snapshots from a recorded or simulated flight, one per tick. `None` items
/// play back as stale ticks.
pub struct ReplaySensors<I> {
    recording: I,
    ticks: u64,
    exhausted: bool,
}

impl<I: Iterator<Item = Option<SensorSnapshot>>> ReplaySensors<I> {
    pub fn new(recording: I) -> Self {
        Self {
            recording,
            ticks: 0,
            exhausted: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl<I: Iterator<Item = Option<SensorSnapshot>> + 'static> SensorSnapshotProvider
    for ReplaySensors<I>
{
    fn refresh(&mut self) -> Option<SensorSnapshot> {
        if self.exhausted {
            return None;
        }

        match self.recording.next() {
            Some(snapshot) => {
                self.ticks += 1;
                snapshot
            }
            None => {
                silprintln!("Recording ended after {} ticks", self.ticks);
                self.exhausted = true;
                None
            }
        }
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorSourceKind {
    Live,
    Replay,
}

/// The data source picked at startup.
pub enum SensorSource<D, I> {
    Live(LiveSensors<D>),
    Replay(ReplaySensors<I>),
}

impl<D, I> SensorSource<D, I>
where
    D: SensorDrivers,
    I: Iterator<Item = Option<SensorSnapshot>>,
{
    pub fn select(kind: SensorSourceKind, drivers: D, recording: I) -> Self {
        match kind {
            SensorSourceKind::Live => SensorSource::Live(LiveSensors::new(drivers)),
            SensorSourceKind::Replay => SensorSource::Replay(ReplaySensors::new(recording)),
        }
    }

    pub fn kind(&self) -> SensorSourceKind {
        match self {
            SensorSource::Live(_) => SensorSourceKind::Live,
            SensorSource::Replay(_) => SensorSourceKind::Replay,
        }
    }

    /// True once a replay has run out. A live source never ends.
    pub fn is_exhausted(&self) -> bool {
        match self {
            SensorSource::Live(_) => false,
            SensorSource::Replay(replay) => replay.is_exhausted(),
        }
    }
}

impl<D, I> SensorSnapshotProvider for SensorSource<D, I>
where
    D: SensorDrivers + 'static,
    I: Iterator<Item = Option<SensorSnapshot>> + 'static,
{
    fn refresh(&mut self) -> Option<SensorSnapshot> {
        match self {
            SensorSource::Live(live) => live.refresh(),
            SensorSource::Replay(replay) => replay.refresh(),
        }
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct BenchDrivers {
        ninedof: Option<NineDofReading>,
        barometer: Option<Barometer>,
        fixes: Vec<Option<GpsFix>>,
    }

    impl SensorDrivers for BenchDrivers {
        fn read_ninedof(&mut self) -> Option<NineDofReading> {
            self.ninedof
        }

        fn read_barometer(&mut self) -> Option<Barometer> {
            self.barometer
        }

        fn read_gps(&mut self) -> Option<GpsFix> {
            if self.fixes.is_empty() {
                None
            } else {
                self.fixes.remove(0)
            }
        }
    }

    fn fix(second: u8) -> GpsFix {
        GpsFix {
            latitude: 47.6,
            longitude: -122.3,
            second,
            ..GpsFix::default()
        }
    }

    #[test]
    fn test_live_keeps_last_fix() {
        let drivers = BenchDrivers {
            ninedof: Some(NineDofReading::default()),
            barometer: Some(Barometer::default()),
            fixes: vec![Some(fix(1)), None, Some(fix(3))],
        };
        let mut sensors = LiveSensors::new(drivers);

        assert_eq!(sensors.refresh().unwrap().gps.second, 1);
        assert_eq!(sensors.refresh().unwrap().gps.second, 1);
        assert_eq!(sensors.refresh().unwrap().gps.second, 3);
    }

    #[test]
    fn test_live_needs_imu_and_barometer() {
        let mut sensors = LiveSensors::new(BenchDrivers {
            ninedof: Some(NineDofReading::default()),
            ..BenchDrivers::default()
        });
        assert_eq!(sensors.refresh(), None);

        sensors.drivers().barometer = Some(Barometer::default());
        sensors.drivers().ninedof = None;
        assert_eq!(sensors.refresh(), None);
    }

    #[test]
    fn test_replay_plays_stale_ticks_and_ends() {
        let frame = SensorSnapshot::default();
        let recording = vec![Some(frame), None, Some(frame)];
        let mut sensors = ReplaySensors::new(recording.into_iter());

        assert_eq!(sensors.refresh(), Some(frame));
        assert_eq!(sensors.refresh(), None);
        assert!(!sensors.is_exhausted());
        assert_eq!(sensors.refresh(), Some(frame));
        assert_eq!(sensors.refresh(), None);
        assert!(sensors.is_exhausted());
        assert_eq!(sensors.ticks(), 3);
    }

    #[test]
    fn test_source_selected_from_config() {
        let kind: SensorSourceKind = serde_json::from_str("\"replay\"").unwrap();
        let empty = Vec::<Option<SensorSnapshot>>::new;
        let source = SensorSource::select(kind, BenchDrivers::default(), empty().into_iter());

        assert_eq!(source.kind(), SensorSourceKind::Replay);

        let mut source = SensorSource::select(
            SensorSourceKind::Live,
            BenchDrivers::default(),
            empty().into_iter(),
        );
        assert_eq!(source.kind(), SensorSourceKind::Live);
        assert_eq!(source.refresh(), None);
        assert!(!source.is_exhausted());
    }
}
