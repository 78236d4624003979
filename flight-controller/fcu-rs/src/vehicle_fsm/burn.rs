use shared::{fcu_hal::Command, ControllerState};

use crate::Fcu;

use super::{coast::Coast, FlightFsm};

pub struct Burn;

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Burn {
    fn update(&mut self, fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        let Some(data) = fcu.sensor_data else {
            return None;
        };

        // Motor burnout
        if data.axial_acceleration() <= fcu.config.thrust_accel_g {
            return Some(Coast::new());
        }

        None
    }

    fn enter_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }

    fn exit_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }
}

impl Burn {
    pub fn new() -> FlightFsm {
        FlightFsm::Burn(Self)
    }
}
