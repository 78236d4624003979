use core::any::Any;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, EnumString, IntoStaticStr};

/// Flight lifecycle stages, in the order the vehicle normally moves through them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumCountMacro,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Init,
    Idle,
    Halt,
    Test,
    Arm,
    Ignite,
    Burn,
    Coast,
    Apogee,
    Wait,
    Eject,
    Fall,
    Recover,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        (*self).into()
    }

    /// Phases the vehicle goes back to after a power loss. Everything before
    /// arming restarts from idle.
    pub fn is_resumable(&self) -> bool {
        !matches!(self, Phase::Init | Phase::Idle | Phase::Test)
    }
}

/// Operator directives. `NoCommand` never comes off the wire, it means nothing
/// was received and nothing is latched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    None,
    Test,
    Arm,
    Disarm,
    Ignite,
    Abort,
    Pass,
    Fail,
    #[serde(skip)]
    NoCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Axes {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude {
    #[serde(rename = "r")]
    pub roll: f32,
    #[serde(rename = "p")]
    pub pitch: f32,
    #[serde(rename = "y")]
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Barometer {
    #[serde(rename = "p")]
    pub pressure: f32,
    #[serde(rename = "dp")]
    pub pressure_rate: f32,
    #[serde(rename = "alt")]
    pub altitude: f32,
    #[serde(rename = "gnd")]
    pub ground_altitude: f32,
    #[serde(rename = "temp")]
    pub temperature: f32,
    #[serde(rename = "hum")]
    pub humidity: f32,
}

impl Barometer {
    pub fn altitude_above_ground(&self) -> f32 {
        self.altitude - self.ground_altitude
    }

    /// Magnitude of `dp`. The sign depends on how the barometer is filtered.
    pub fn pressure_rate_magnitude(&self) -> f32 {
        if self.pressure_rate < 0.0 {
            -self.pressure_rate
        } else {
            self.pressure_rate
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GpsFix {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    pub hour: u8,
    #[serde(rename = "min")]
    pub minute: u8,
    #[serde(rename = "sec")]
    pub second: u8,
    pub day: u8,
    #[serde(rename = "mon")]
    pub month: u8,
    pub year: u16,
}

/// Latest readings of every sensor, taken once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub gyro: Axes,
    /// Acceleration in g. `z` is the vehicle's longitudinal axis.
    pub acc: Axes,
    pub mag: Axes,
    pub att: Attitude,
    pub bar: Barometer,
    pub gps: GpsFix,
}

impl SensorSnapshot {
    pub fn axial_acceleration(&self) -> f32 {
        self.acc.z
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumCountMacro, EnumIter, EnumString,
)]
pub enum OutputChannel {
    Ignition,
    DrogueCharge,
    MainChute,
}

impl OutputChannel {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default = "FcuConfig::default")]
pub struct FcuConfig {
    pub idle_delay_ms: u32,
    pub max_ignite_ticks: u32,
    pub min_accel_g: f32,
    pub thrust_accel_g: f32,
    pub apogee_dpres: f32,
    pub min_dpres: f32,
    pub main_alt: f32,
    pub parachute_delay_ms: u64,
    pub comm_count: u32,
    pub comm_delay_ms: u32,
    // 0 sends telemetry every tick
    pub telemetry_rate_ms: u64,
}

impl FcuConfig {
    pub const fn default() -> Self {
        Self {
            idle_delay_ms: 1000,
            max_ignite_ticks: 300,
            min_accel_g: 2.0,
            thrust_accel_g: 0.0,
            apogee_dpres: 1.0,
            min_dpres: 1.0,
            main_alt: 2000.0,
            parachute_delay_ms: 1000,
            comm_count: 10,
            comm_delay_ms: 10,
            telemetry_rate_ms: 0,
        }
    }
}

pub trait FcuDriver {
    /// Milliseconds since boot.
    fn timestamp(&self) -> u64;
    /// Blocks the control loop.
    fn delay_ms(&mut self, ms: u32);

    fn set_output_channel(&mut self, channel: OutputChannel, state: bool);
    fn get_output_channel(&self, channel: OutputChannel) -> bool;
    fn get_output_channel_continuity(&self, channel: OutputChannel) -> bool;

    fn as_mut_any(&mut self) -> &mut dyn Any;
}

pub trait SensorSnapshotProvider {
    /// Returns `None` if the sensors could not be read this tick.
    fn refresh(&mut self) -> Option<SensorSnapshot>;

    fn as_mut_any(&mut self) -> &mut dyn Any;
}
