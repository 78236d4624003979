use std::any::Any;
use std::time::Duration;

use shared::fcu_hal::{FcuDriver, OutputChannel};
use strum::EnumCount;

/// Output channel change, stamped with the simulated time it happened at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputEvent {
    pub timestamp: u64,
    pub channel: OutputChannel,
    pub state: bool,
}

/// Host stand-in for the board. Time is simulated and only moves when the
/// loop sleeps; in realtime mode every sleep also blocks the thread.
#[derive(Debug)]
pub struct FcuDriverSim {
    timestamp: u64,
    realtime: bool,
    outputs: [bool; OutputChannel::COUNT],
    continuities: [bool; OutputChannel::COUNT],
    pub output_log: Vec<OutputEvent>,
}

impl FcuDriver for FcuDriverSim {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms as u64);
    }

    fn set_output_channel(&mut self, channel: OutputChannel, state: bool) {
        if self.outputs[channel.index()] != state {
            self.output_log.push(OutputEvent {
                timestamp: self.timestamp,
                channel,
                state,
            });
        }

        self.outputs[channel.index()] = state;
    }

    fn get_output_channel(&self, channel: OutputChannel) -> bool {
        self.outputs[channel.index()]
    }

    fn get_output_channel_continuity(&self, channel: OutputChannel) -> bool {
        self.continuities[channel.index()]
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl FcuDriverSim {
    pub fn new(realtime: bool) -> Self {
        Self {
            timestamp: 0,
            realtime,
            outputs: [false; OutputChannel::COUNT],
            continuities: [true; OutputChannel::COUNT],
            output_log: Vec::new(),
        }
    }

    pub fn advance(&mut self, ms: u64) {
        if self.realtime {
            std::thread::sleep(Duration::from_millis(ms));
        }

        self.timestamp += ms;
    }

    pub fn set_output_channel_continuity(&mut self, channel: OutputChannel, state: bool) {
        self.continuities[channel.index()] = state;
    }
}
