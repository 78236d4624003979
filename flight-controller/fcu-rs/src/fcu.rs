use alloc::format;

use shared::{
    comms_hal::{OutboundMessage, SerialLink},
    fcu_hal::{FcuConfig, FcuDriver, Phase, SensorSnapshot, SensorSnapshotProvider},
    persistence::{self, PersistentRecord, PersistentStore},
    util::LoopTimer,
    ControllerEntity, DataPointLogger,
};

use crate::{
    comms::LinkCodec,
    vehicle_fsm::{init::Init, FlightFsm},
};

pub struct Fcu<'a> {
    pub(crate) config: FcuConfig,
    pub phase: Phase,
    pub driver: &'a mut dyn FcuDriver,
    pub link: &'a mut dyn SerialLink,
    pub flight_log: &'a mut dyn DataPointLogger<str>,
    pub store: &'a mut dyn PersistentStore,
    pub sensors: &'a mut dyn SensorSnapshotProvider,
    pub sensor_data: Option<SensorSnapshot>,
    pub(crate) vehicle_fsm: Option<ControllerEntity<FlightFsm, Fcu<'a>, Phase>>,
    pub(crate) resume_phase: Option<Phase>,
    record: PersistentRecord,
    codec: LinkCodec,
    telemetry_timer: LoopTimer<u64>,
    timestamp: u64,
}

impl<'a> Fcu<'a> {
    pub fn new(
        config: FcuConfig,
        driver: &'a mut dyn FcuDriver,
        link: &'a mut dyn SerialLink,
        flight_log: &'a mut dyn DataPointLogger<str>,
        store: &'a mut dyn PersistentStore,
        sensors: &'a mut dyn SensorSnapshotProvider,
    ) -> Self {
        let stored_record = persistence::load(store);
        let resume_phase = stored_record
            .filter(|record| !record.ground && record.phase.is_resumable())
            .map(|record| record.phase);

        if let Some(record) = stored_record {
            silprintln!("Loaded record: {:?}", record);
        } else {
            silprintln!("No valid record, starting fresh");
        }

        flight_log.set_logging_enabled(true);

        let timestamp = driver.timestamp();
        let mut fcu = Self {
            codec: LinkCodec::new(&config),
            telemetry_timer: LoopTimer::new(config.telemetry_rate_ms),
            config,
            phase: Phase::Init,
            driver,
            link,
            flight_log,
            store,
            sensors,
            sensor_data: None,
            vehicle_fsm: None,
            resume_phase,
            record: stored_record.unwrap_or(PersistentRecord::default()),
            timestamp,
        };

        fcu.vehicle_fsm = Some(ControllerEntity::new(&mut fcu, Init::new()));

        fcu
    }

    /// One pass of the control loop. Never fails; every fault is handled
    /// inside the tick.
    pub fn update(&mut self) {
        let timestamp = self.driver.timestamp();
        let dt = timestamp.saturating_sub(self.timestamp);
        self.timestamp = timestamp;

        self.sensor_data = self.sensors.refresh();

        let (command, decode_error) = self.codec.recv_command(self.link);
        if let Some(err) = decode_error {
            silprintln!("Dropped inbound message: {:?}", err);

            if self.record.debug {
                self.report_error(&format!("bad command: {:?}", err));
            }
        }

        if let Some(phase) = self.update_vehicle_fsm(command) {
            self.confirm_phase(phase);
        }

        if self.telemetry_timer.should_update(dt) {
            if let Some(sensors) = self.sensor_data {
                self.send_message(&OutboundMessage::Telemetry {
                    time: self.timestamp,
                    state: self.phase,
                    sensors,
                });
            }
        }

        if self.phase == Phase::Idle {
            self.driver.delay_ms(self.config.idle_delay_ms);
        }
    }

    pub fn configure_fcu(&mut self, config: FcuConfig) {
        self.codec.configure(&config);
        self.telemetry_timer.set_interval(config.telemetry_rate_ms);
        self.config = config;
    }

    pub fn get_fcu_config(&self) -> FcuConfig {
        self.config.clone()
    }

    pub fn debug_mode(&self) -> bool {
        self.record.debug
    }

    pub fn ground_override(&self) -> bool {
        self.record.ground
    }

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.record.debug = enabled;
        self.persist_record();
    }

    /// While set, a reset always restarts from idle instead of resuming.
    pub fn set_ground_override(&mut self, enabled: bool) {
        self.record.ground = enabled;
        self.persist_record();
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub(crate) fn report_result(&mut self, pass: bool) {
        self.send_message(&OutboundMessage::Result {
            time: self.timestamp,
            pass,
        });
    }

    pub(crate) fn report_error(&mut self, message: &str) {
        self.send_message(&OutboundMessage::Error {
            time: self.timestamp,
            message: message.into(),
        });
    }

    // Outputs for the new phase are already set by its entry action, so a
    // storage fault here can't hold back actuation.
    fn confirm_phase(&mut self, phase: Phase) {
        silprintln!("Phase {} -> {}", self.phase.name(), phase.name());

        self.phase = phase;
        self.record.phase = phase;
        self.persist_record();

        self.send_message(&OutboundMessage::State {
            time: self.timestamp,
            state: phase,
        });
    }

    fn persist_record(&mut self) {
        if let Err(err) = persistence::save(self.store, &self.record) {
            silprintln!("Failed to persist {:?}: {:?}", self.record, err);
            self.report_error(&format!("persistence: {:?}", err));
        }
    }

    fn send_message(&mut self, message: &OutboundMessage) {
        if let Err(err) = self
            .codec
            .send(self.link, self.flight_log, self.driver, message)
        {
            silprintln!("Failed to encode {:?}: {:?}", message, err);
        }
    }
}
