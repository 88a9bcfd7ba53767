//! Integration tests for the relay controller public API
//!
//! A recording transport stands in for the serial port, so these run
//! without hardware.

use kmrelay_core::{BoardInfo, DefaultBoard, PortInfo, RelayError, RelayState, Result};
use kmrelay_hardware::{select_device_port, KmtronicRelay, RelayController, SerialTransport};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct Wire {
    frames: Vec<Vec<u8>>,
    closes: usize,
}

struct RecordingTransport {
    wire: Arc<Mutex<Wire>>,
    open: bool,
}

impl SerialTransport for RecordingTransport {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        if !self.open {
            return Err(RelayError::WriteFailure("not open".to_string()));
        }
        self.wire.lock().unwrap().frames.push(frame.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.wire.lock().unwrap().closes += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn port_path(&self) -> Option<&str> {
        Some("/dev/ttyUSB0")
    }
}

fn controller() -> (RelayController<RecordingTransport>, Arc<Mutex<Wire>>) {
    let wire = Arc::new(Mutex::new(Wire::default()));
    let transport = RecordingTransport {
        wire: wire.clone(),
        open: true,
    };
    (
        RelayController::with_transport(Box::new(transport), BoardInfo::of::<DefaultBoard>()),
        wire,
    )
}

#[test]
fn test_on_off_frames_for_every_channel() {
    let (mut relay, wire) = controller();

    for channel in 0..relay.channel_count() {
        relay.turn_on(channel).unwrap();
        assert_eq!(relay.get_state(channel).unwrap(), RelayState::Energized);
        relay.turn_off(channel).unwrap();
        assert_eq!(relay.get_state(channel).unwrap(), RelayState::DeEnergized);
    }

    let frames = wire.lock().unwrap().frames.clone();
    let expected: Vec<Vec<u8>> = (1..=4u8)
        .flat_map(|relay| [vec![0xFF, relay, 0x01], vec![0xFF, relay, 0x00]])
        .collect();
    assert_eq!(frames, expected);
}

#[test]
fn test_all_on_then_all_off() {
    let (mut relay, wire) = controller();

    relay.turn_all_on().unwrap();
    assert_eq!(relay.status().energized_count(), 4);

    relay.turn_all_off().unwrap();
    assert_eq!(relay.status().energized_count(), 0);

    let frames = wire.lock().unwrap().frames.clone();
    assert_eq!(frames.len(), 8);
    assert!(frames[..4].iter().all(|f| f[2] == 0x01));
    assert!(frames[4..].iter().all(|f| f[2] == 0x00));
}

#[test]
fn test_toggle_blocks_between_frames() {
    let (mut relay, wire) = controller();
    let delay = Duration::from_millis(30);

    let start = Instant::now();
    relay.toggle(3, delay).unwrap();
    assert!(start.elapsed() >= delay);

    assert_eq!(
        wire.lock().unwrap().frames,
        vec![vec![0xFF, 0x04, 0x01], vec![0xFF, 0x04, 0x00]]
    );
}

#[test]
fn test_close_twice_then_operate() {
    let (mut relay, wire) = controller();

    relay.close();
    relay.close();

    assert!(matches!(relay.turn_on(0), Err(RelayError::NotConnected)));
    assert!(matches!(relay.turn_all_on(), Err(RelayError::NotConnected)));

    let wire = wire.lock().unwrap();
    assert_eq!(wire.closes, 1);
    assert!(wire.frames.is_empty());
}

#[test]
fn test_scope_exit_releases_transport_on_error_path() {
    let wire = {
        let (mut relay, wire) = controller();
        let outcome: Result<()> = (|| {
            relay.turn_on(0)?;
            relay.turn_on(7)?;
            relay.turn_on(1)
        })();
        assert!(matches!(outcome, Err(RelayError::InvalidChannel { .. })));
        wire
    };

    let wire = wire.lock().unwrap();
    assert_eq!(wire.closes, 1);
    assert_eq!(wire.frames, vec![vec![0xFF, 0x01, 0x01]]);
}

#[test]
fn test_session_with_missing_port_never_runs_closure() {
    let mut ran = false;
    let result = KmtronicRelay::session(Some("/dev/kmrelay-does-not-exist"), |_| {
        ran = true;
        Ok(())
    });

    assert!(matches!(result, Err(RelayError::ConnectionFailure { .. })));
    assert!(!ran);
}

#[test]
fn test_discovery_selection_through_public_api() {
    let ports = vec![
        PortInfo::new("/dev/ttyS0"),
        PortInfo::new("/dev/ttyUSB1").with_description("FTDI FT232R"),
        PortInfo::new("/dev/ttyUSB2").with_usb_ids(0x1337, 0x0088),
    ];
    let selected = select_device_port::<DefaultBoard>(&ports).unwrap();
    assert_eq!(selected.path, "/dev/ttyUSB2");

    let ports = vec![
        PortInfo::new("/dev/ttyS0"),
        PortInfo::new("/dev/ttyACM0").with_description("Arduino Uno"),
    ];
    assert!(select_device_port::<DefaultBoard>(&ports).is_none());
}
