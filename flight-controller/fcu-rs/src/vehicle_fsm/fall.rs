use shared::{fcu_hal::Command, ControllerState};

use crate::Fcu;

use super::{recover::Recover, FlightFsm};

/// Descending under drogue.
pub struct Fall;

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Fall {
    fn update(&mut self, fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        let Some(data) = fcu.sensor_data else {
            return None;
        };

        if data.bar.altitude_above_ground() <= fcu.config.main_alt {
            return Some(Recover::new());
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

impl Fall {
    pub fn new() -> FlightFsm {
        FlightFsm::Fall(Self)
    }
}
