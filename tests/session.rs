//! End-to-end sessions against an in-memory driver.

use g4track::protocol::{Action, CMD_UNITS};
use g4track::wire::{RawFrameData, RawSensorData};
use g4track::{
    CommandEnvelope, DataKind, Driver, G4Error, OrientationUnit, Payload, PositionUnit,
    StatusCode, Target, Tracker, UnitConfig,
};
use std::ffi::CStr;
use std::sync::{Arc, Mutex};

const NO_CONNECTION: u32 = (-95i32) as u32;
const UNSUPPORTED_TYPE: u32 = (-98i32) as u32;

#[derive(Default)]
struct Log {
    config_path: Vec<u8>,
    queries: Vec<(i32, Action, i32)>,
    closes: usize,
}

/// Simulated single-hub system with one sensor plugged into slot 1.
struct SimDriver {
    log: Arc<Mutex<Log>>,
    init_status: u32,
    fail_orientation_units: bool,
    units: [i32; 2],
}

impl SimDriver {
    fn new(log: Arc<Mutex<Log>>) -> Self {
        Self {
            log,
            init_status: 0,
            fail_orientation_units: false,
            units: [0, 0],
        }
    }
}

impl Driver for SimDriver {
    fn init_sys(&mut self, config_path: &CStr, system_id: &mut i32) -> u32 {
        self.log.lock().unwrap().config_path = config_path.to_bytes().to_vec();
        *system_id = 0;
        self.init_status
    }

    fn close_tracker(&mut self) {
        self.log.lock().unwrap().closes += 1;
    }

    fn get_frame_data(&mut self, frames: &mut [RawFrameData], _system_id: i32, hubs: &[i32]) -> u32 {
        for (frame, &hub) in frames.iter_mut().zip(hubs) {
            frame.hub = hub as u32;
            frame.frame = 10;
            frame.station_map = 0b010;
            frame.sensors[1] = RawSensorData {
                id: 1,
                pos: [4.0, 5.0, 6.0],
                ori: [0.0, 90.0, 0.0, 0.0],
            };
        }
        let returned = hubs.len().min(1) as u32;
        (1 << 16) | returned
    }

    fn set_query(&mut self, envelope: &mut CommandEnvelope<'_>) -> u32 {
        self.log
            .lock()
            .unwrap()
            .queries
            .push((envelope.command, envelope.action, envelope.param));

        if envelope.command == CMD_UNITS {
            let slot = if envelope.param == DataKind::Position as i32 { 0 } else { 1 };
            if slot == 1 && self.fail_orientation_units {
                return UNSUPPORTED_TYPE;
            }
            if let Payload::Int(code) = &mut envelope.payload {
                match envelope.action {
                    Action::Set => self.units[slot] = **code,
                    Action::Get => **code = self.units[slot],
                    Action::Reset => self.units[slot] = 0,
                }
            }
        }
        0
    }
}

#[test]
fn open_poll_and_close() {
    let log = Arc::new(Mutex::new(Log::default()));
    let tracker = Tracker::open(SimDriver::new(log.clone()), "first_calibration.g4c").unwrap();
    assert!(tracker.system_id() >= 0);
    assert_eq!(log.lock().unwrap().config_path, b"first_calibration.g4c");

    let (snapshot, counts) = tracker.lock().unwrap().get_hub_frame(0).unwrap();
    assert_eq!((counts.active, counts.returned), (1, 1));
    assert_eq!(snapshot.station_map.bits().count_ones(), 1);
    assert!(snapshot.station_map.is_active(1));

    let active: Vec<_> = snapshot.active_sensors().collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].1.position, [4.0, 5.0, 6.0]);

    tracker.close();
    assert_eq!(log.lock().unwrap().closes, 1);
}

#[test]
fn failed_initialize_reports_status() {
    let log = Arc::new(Mutex::new(Log::default()));
    let mut driver = SimDriver::new(log);
    driver.init_status = NO_CONNECTION;

    match Tracker::open(driver, "missing.g4c") {
        Err(G4Error::Driver { status, .. }) => assert_eq!(status, StatusCode::NoConnection),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn units_round_trip() {
    let log = Arc::new(Mutex::new(Log::default()));
    let tracker = Tracker::open(SimDriver::new(log), "cal.g4c").unwrap();
    let units = UnitConfig::new(PositionUnit::Meter, OrientationUnit::Quaternion);

    let mut session = tracker.lock().unwrap();
    session.set_units(units).unwrap();
    assert_eq!(session.units().unwrap(), units);
}

#[test]
fn units_failure_short_circuits() {
    let log = Arc::new(Mutex::new(Log::default()));
    let mut driver = SimDriver::new(log.clone());
    driver.fail_orientation_units = true;
    let tracker = Tracker::open(driver, "cal.g4c").unwrap();

    let units = UnitConfig::new(PositionUnit::Centimeter, OrientationUnit::EulerDegree);
    let err = tracker.lock().unwrap().set_units(units).unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UnsupportedType));

    let log = log.lock().unwrap();
    assert_eq!(log.queries.len(), 1);
    assert_eq!(log.queries[0], (CMD_UNITS, Action::Set, DataKind::Orientation as i32));
}

#[test]
fn wildcard_get_never_reaches_driver() {
    let log = Arc::new(Mutex::new(Log::default()));
    let tracker = Tracker::open(SimDriver::new(log.clone()), "cal.g4c").unwrap();

    let err = tracker.lock().unwrap().tip_offset(Target::All).unwrap_err();
    assert!(matches!(err, G4Error::WildcardNotAllowed { .. }));
    assert!(log.lock().unwrap().queries.is_empty());
}
