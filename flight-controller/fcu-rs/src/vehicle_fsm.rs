use shared::{
    fcu_hal::{Command, Phase},
    ControllerFsm, ControllerState,
};

use crate::Fcu;

pub mod apogee;
pub mod arm;
pub mod burn;
pub mod coast;
pub mod eject;
pub mod fall;
pub mod halt;
pub mod idle;
pub mod ignite;
pub mod init;
pub mod recover;
pub mod wait;

use halt::HaltReason;

pub enum FlightFsm {
    Init(init::Init),
    Idle(idle::Idle),
    Halt(halt::Halt),
    Test(test::Test),
    Arm(arm::Arm),
    Ignite(ignite::Ignite),
    Burn(burn::Burn),
    Coast(coast::Coast),
    Apogee(apogee::Apogee),
    Wait(wait::Wait),
    Eject(eject::Eject),
    Fall(fall::Fall),
    Recover(recover::Recover),
}

impl<'a> ControllerFsm<FlightFsm, Fcu<'a>, Phase> for FlightFsm {
    fn to_controller_state(&mut self) -> &mut dyn ControllerState<FlightFsm, Fcu<'a>> {
        match self {
            FlightFsm::Init(state) => state,
            FlightFsm::Idle(state) => state,
            FlightFsm::Halt(state) => state,
            FlightFsm::Test(state) => state,
            FlightFsm::Arm(state) => state,
            FlightFsm::Ignite(state) => state,
            FlightFsm::Burn(state) => state,
            FlightFsm::Coast(state) => state,
            FlightFsm::Apogee(state) => state,
            FlightFsm::Wait(state) => state,
            FlightFsm::Eject(state) => state,
            FlightFsm::Fall(state) => state,
            FlightFsm::Recover(state) => state,
        }
    }

    fn hal_state(&self) -> Phase {
        match self {
            FlightFsm::Init(_) => Phase::Init,
            FlightFsm::Idle(_) => Phase::Idle,
            FlightFsm::Halt(_) => Phase::Halt,
            FlightFsm::Test(_) => Phase::Test,
            FlightFsm::Arm(_) => Phase::Arm,
            FlightFsm::Ignite(_) => Phase::Ignite,
            FlightFsm::Burn(_) => Phase::Burn,
            FlightFsm::Coast(_) => Phase::Coast,
            FlightFsm::Apogee(_) => Phase::Apogee,
            FlightFsm::Wait(_) => Phase::Wait,
            FlightFsm::Eject(_) => Phase::Eject,
            FlightFsm::Fall(_) => Phase::Fall,
            FlightFsm::Recover(_) => Phase::Recover,
        }
    }
}

impl FlightFsm {
    /// Fresh state for a phase restored after a reset. Phase timers start over.
    pub fn resume(phase: Phase) -> FlightFsm {
        match phase {
            Phase::Init | Phase::Idle | Phase::Test => idle::Idle::new(),
            Phase::Halt => halt::Halt::new(HaltReason::Resumed),
            Phase::Arm => arm::Arm::new(),
            Phase::Ignite => ignite::Ignite::new(),
            Phase::Burn => burn::Burn::new(),
            Phase::Coast => coast::Coast::new(),
            Phase::Apogee => apogee::Apogee::new(),
            Phase::Wait => wait::Wait::new(),
            Phase::Eject => eject::Eject::new(),
            Phase::Fall => fall::Fall::new(),
            Phase::Recover => recover::Recover::new(),
        }
    }
}

impl<'a> Fcu<'a> {
    /// Runs one tick of the flight FSM. Returns the new phase if it changed.
    pub(crate) fn update_vehicle_fsm(&mut self, command: Command) -> Option<Phase> {
        let mut vehicle_fsm = self.vehicle_fsm.take()?;

        // Abort wins over every phase guard
        let transitioned = if command == Command::Abort && vehicle_fsm.hal_state() != Phase::Halt {
            silprintln!("Abort received in {}", vehicle_fsm.hal_state().name());
            vehicle_fsm.transition(self, halt::Halt::new(HaltReason::Abort));
            true
        } else {
            vehicle_fsm.update(self, command)
        };

        let phase = vehicle_fsm.hal_state();
        self.vehicle_fsm = Some(vehicle_fsm);

        transitioned.then_some(phase)
    }
}
