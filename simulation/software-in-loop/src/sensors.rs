use rocket_fcu::sensors::{NineDofReading, SensorDrivers};
use shared::fcu_hal::{Barometer, GpsFix};

/// Live source for a host with no sensor hardware attached. Every read times
/// out, so the controller sees a stale snapshot each tick.
#[derive(Debug, Default)]
pub struct DisconnectedDrivers;

impl SensorDrivers for DisconnectedDrivers {
    fn read_ninedof(&mut self) -> Option<NineDofReading> {
        None
    }

    fn read_barometer(&mut self) -> Option<Barometer> {
        None
    }

    fn read_gps(&mut self) -> Option<GpsFix> {
        None
    }
}
