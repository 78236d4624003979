use shared::fcu_hal::OutputChannel;
use strum::IntoEnumIterator;

use crate::Fcu;

impl<'a> Fcu<'a> {
    /// Pre-flight check run when entering the test phase: sensors must be
    /// readable and every pyro channel must show continuity.
    pub(crate) fn self_check(&self) -> bool {
        let sensors_ok = self.sensor_data.is_some();
        if !sensors_ok {
            silprintln!("Self check: sensors unavailable");
        }

        let mut continuity_ok = true;
        for channel in OutputChannel::iter() {
            if !self.driver.get_output_channel_continuity(channel) {
                silprintln!("Self check: no continuity on {:?}", channel);
                continuity_ok = false;
            }
        }

        sensors_ok && continuity_ok
    }

    pub(crate) fn all_outputs_off(&mut self) {
        for channel in OutputChannel::iter() {
            self.driver.set_output_channel(channel, false);
        }
    }
}
