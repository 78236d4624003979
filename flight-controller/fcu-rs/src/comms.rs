use alloc::string::String;

use shared::{
    comms_hal::{
        CommandMessage, LinkError, OutboundMessage, SerialLink, SerializationError,
        MAX_MESSAGE_SIZE,
    },
    fcu_hal::{Command, FcuConfig, FcuDriver, Phase, SensorSnapshot},
    DataPointLogger,
};

/// Holds the last decoded command for a fixed number of ticks so a command
/// that arrives between polls is still seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLatch {
    command: Command,
    remaining: u32,
}

impl CommandLatch {
    pub const fn new() -> Self {
        Self {
            command: Command::NoCommand,
            remaining: 0,
        }
    }

    /// Latches a freshly decoded command. It is reported on this tick and the
    /// next `hold_ticks - 1` ticks.
    pub fn latch(&mut self, command: Command, hold_ticks: u32) -> Command {
        self.command = command;
        self.remaining = hold_ticks.saturating_sub(1);

        command
    }

    /// Called on ticks where nothing was received.
    pub fn tick(&mut self) -> Command {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.command
        } else {
            self.clear();
            Command::NoCommand
        }
    }

    pub fn clear(&mut self) {
        self.command = Command::NoCommand;
        self.remaining = 0;
    }

    pub fn command(&self) -> Command {
        self.command
    }
}

pub struct LinkCodec {
    latch: CommandLatch,
    comm_count: u32,
    comm_delay_ms: u32,
    rx_buffer: [u8; MAX_MESSAGE_SIZE],
}

impl LinkCodec {
    pub fn new(config: &FcuConfig) -> Self {
        Self {
            latch: CommandLatch::new(),
            comm_count: config.comm_count,
            comm_delay_ms: config.comm_delay_ms,
            rx_buffer: [0u8; MAX_MESSAGE_SIZE],
        }
    }

    pub fn configure(&mut self, config: &FcuConfig) {
        self.comm_count = config.comm_count;
        self.comm_delay_ms = config.comm_delay_ms;
    }

    pub fn encode_telemetry(
        snapshot: &SensorSnapshot,
        phase: Phase,
        time: u64,
    ) -> Result<String, SerializationError> {
        OutboundMessage::Telemetry {
            time,
            state: phase,
            sensors: *snapshot,
        }
        .to_json()
    }

    pub fn encode_state(phase: Phase, time: u64) -> Result<String, SerializationError> {
        OutboundMessage::State { time, state: phase }.to_json()
    }

    pub fn encode_result(pass: bool, time: u64) -> Result<String, SerializationError> {
        OutboundMessage::Result { time, pass }.to_json()
    }

    pub fn encode_error(message: &str, time: u64) -> Result<String, SerializationError> {
        OutboundMessage::Error {
            time,
            message: String::from(message),
        }
        .to_json()
    }

    /// Writes one message to the link and the flight log, then blocks for the
    /// pacing delay and until the link has drained. A link failure is not
    /// reported back, the flight log still gets the line.
    pub fn send(
        &self,
        link: &mut dyn SerialLink,
        log: &mut dyn DataPointLogger<str>,
        driver: &mut dyn FcuDriver,
        message: &OutboundMessage,
    ) -> Result<(), SerializationError> {
        let text = message.to_json()?;

        if let Err(err) = link.send_line(text.as_bytes()) {
            silprintln!("Failed to send {} bytes: {:?}", text.len(), err);
        }

        log.log_data_point(&text);
        driver.delay_ms(self.comm_delay_ms);

        if let Err(err) = link.flush() {
            silprintln!("Failed to flush link: {:?}", err);
        }

        Ok(())
    }

    pub fn decode_command(data: &[u8]) -> Result<Command, SerializationError> {
        let message: CommandMessage = serde_json::from_slice(data)?;

        Ok(message.command)
    }

    /// Polls the link once and runs the result through the latch. The error is
    /// returned alongside so the caller can report it; the command is already
    /// `NoCommand` in that case.
    pub fn recv_command(
        &mut self,
        link: &mut dyn SerialLink,
    ) -> (Command, Option<SerializationError>) {
        match link.recv_line(&mut self.rx_buffer) {
            Ok(Some(size)) => match Self::decode_command(&self.rx_buffer[..size]) {
                Ok(command) => (self.latch.latch(command, self.comm_count), None),
                Err(err) => {
                    self.latch.clear();
                    (Command::NoCommand, Some(err))
                }
            },
            Ok(None) => (self.latch.tick(), None),
            Err(LinkError::MessageTooLong) => {
                self.latch.clear();
                (Command::NoCommand, Some(SerializationError::MessageTooLong))
            }
            Err(err) => {
                silprintln!("Failed to read link: {:?}", err);
                (self.latch.tick(), None)
            }
        }
    }

    pub fn latched_command(&self) -> Command {
        self.latch.command()
    }
}

#[cfg(test)]
mod tests {
    use core::any::Any;

    use super::*;
    use shared::fcu_hal::{Attitude, Axes, Barometer, GpsFix};
    use shared::fcu_mock::{FcuDriverMock, FlightLogMock, SerialLinkMock};
    use strum::IntoEnumIterator;

    fn codec() -> LinkCodec {
        LinkCodec::new(&FcuConfig::default())
    }

    #[test]
    fn test_latch_holds_for_comm_count_ticks() {
        let mut codec = codec();
        let mut link = SerialLinkMock::new();

        assert_eq!(codec.recv_command(&mut link).0, Command::NoCommand);

        link.add_recv_line("{\"command\":\"arm\"}");
        let reported: Vec<Command> = (0..12).map(|_| codec.recv_command(&mut link).0).collect();

        assert_eq!(&reported[..10], &[Command::Arm; 10]);
        assert_eq!(&reported[10..], &[Command::NoCommand; 2]);
    }

    #[test]
    fn test_new_command_restarts_latch() {
        let mut codec = codec();
        let mut link = SerialLinkMock::new();

        link.add_recv_line("{\"command\":\"arm\"}");
        for _ in 0..5 {
            assert_eq!(codec.recv_command(&mut link).0, Command::Arm);
        }

        link.add_recv_line("{\"command\":\"disarm\"}");
        for _ in 0..10 {
            assert_eq!(codec.recv_command(&mut link).0, Command::Disarm);
        }
        assert_eq!(codec.recv_command(&mut link).0, Command::NoCommand);
    }

    #[test]
    fn test_zero_comm_count_reports_once() {
        let config = FcuConfig {
            comm_count: 0,
            ..FcuConfig::default()
        };
        let mut codec = LinkCodec::new(&config);
        let mut link = SerialLinkMock::new();

        link.add_recv_line("{\"command\":\"test\"}");
        assert_eq!(codec.recv_command(&mut link).0, Command::Test);
        assert_eq!(codec.recv_command(&mut link).0, Command::NoCommand);
    }

    #[test]
    fn test_decode_vocabulary() {
        for command in Command::iter().filter(|c| *c != Command::NoCommand) {
            let name = serde_json::to_string(&command).unwrap();
            let line = format!("{{\"command\":{}}}", name);
            assert_eq!(LinkCodec::decode_command(line.as_bytes()), Ok(command));
        }

        // Explicit no-op is distinct from nothing received
        assert_eq!(
            LinkCodec::decode_command(b"{\"command\":\"none\"}"),
            Ok(Command::None)
        );
    }

    #[test]
    fn test_unknown_command_clears_latch() {
        let mut codec = codec();
        let mut link = SerialLinkMock::new();

        link.add_recv_line("{\"command\":\"arm\"}");
        assert_eq!(codec.recv_command(&mut link).0, Command::Arm);

        link.add_recv_line("{\"command\":\"launch\"}");
        assert_eq!(
            codec.recv_command(&mut link),
            (Command::NoCommand, Some(SerializationError::UnknownCommand))
        );
        assert_eq!(codec.latched_command(), Command::NoCommand);
        assert_eq!(codec.recv_command(&mut link), (Command::NoCommand, None));
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(
            LinkCodec::decode_command(b"arm"),
            Err(SerializationError::BadEncoding)
        );
        assert_eq!(
            LinkCodec::decode_command(b"{\"command\":\"ar"),
            Err(SerializationError::UnexpectedEnd)
        );
        assert_eq!(
            LinkCodec::decode_command(b"{\"cmd\":\"arm\"}"),
            Err(SerializationError::UnknownCommand)
        );
        assert_eq!(
            LinkCodec::decode_command(b"{\"command\":\"nocommand\"}"),
            Err(SerializationError::UnknownCommand)
        );
    }

    #[test]
    fn test_telemetry_round_trip() {
        let snapshot = SensorSnapshot {
            gyro: Axes { x: 0.5, y: -1.25, z: 3.0 },
            acc: Axes { x: 0.01, y: -0.02, z: 2.1 },
            mag: Axes { x: 22.5, y: -4.0, z: 41.75 },
            att: Attitude { roll: 1.5, pitch: 88.0, yaw: -179.5 },
            bar: Barometer {
                pressure: 1003.25,
                pressure_rate: -0.75,
                altitude: 2311.5,
                ground_altitude: 312.0,
                temperature: 18.5,
                humidity: 41.0,
            },
            gps: GpsFix {
                latitude: 32.990_254,
                longitude: -106.974_998,
                hour: 14,
                minute: 3,
                second: 59,
                day: 21,
                month: 6,
                year: 2024,
            },
        };

        let text = LinkCodec::encode_telemetry(&snapshot, Phase::Burn, 81_234).unwrap();
        let decoded: OutboundMessage = serde_json::from_str(&text).unwrap();

        let (time, state, sensors) = match decoded {
            OutboundMessage::Telemetry { time, state, sensors } => (time, state, sensors),
            other => panic!("Expected telemetry, got {:?}", other),
        };
        assert_eq!(time, 81_234);
        assert_eq!(state, Phase::Burn);

        assert_eq!(sensors, snapshot);
    }

    #[test]
    fn test_send_paces_and_logs() {
        let codec = codec();
        let mut link = SerialLinkMock::new();
        let mut log = FlightLogMock::new();
        let mut driver = FcuDriverMock::new();
        log.set_logging_enabled(true);

        let message = OutboundMessage::State {
            time: 10,
            state: Phase::Idle,
        };
        codec.send(&mut link, &mut log, &mut driver, &message).unwrap();

        let expected = LinkCodec::encode_state(Phase::Idle, 10).unwrap();
        assert_eq!(link.sent, [expected.clone()]);
        assert_eq!(log.lines, [expected]);
        assert_eq!(link.flushes, 1);
        assert_eq!(driver.delays, [10]);
    }

    struct BrokenLink;

    impl SerialLink for BrokenLink {
        fn send_line(&mut self, _data: &[u8]) -> Result<(), LinkError> {
            Err(LinkError::WriteFailed)
        }

        fn flush(&mut self) -> Result<(), LinkError> {
            Err(LinkError::FlushFailed)
        }

        fn recv_line(&mut self, _data: &mut [u8]) -> Result<Option<usize>, LinkError> {
            Err(LinkError::ReadFailed)
        }

        fn as_mut_any(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_broken_link_still_logs() {
        let mut codec = codec();
        let mut log = FlightLogMock::new();
        let mut driver = FcuDriverMock::new();
        log.set_logging_enabled(true);

        let message = OutboundMessage::Result { time: 3, pass: false };
        assert_eq!(codec.send(&mut BrokenLink, &mut log, &mut driver, &message), Ok(()));
        assert_eq!(log.lines.len(), 1);

        // Read faults count as "nothing received"
        assert_eq!(codec.recv_command(&mut BrokenLink), (Command::NoCommand, None));
    }
}
