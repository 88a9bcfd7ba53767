//! kmrelay-hardware
//!
//! Hardware crate that contains port discovery, the wire protocol, the
//! low-level serial driver and the high-level relay controller. This crate is
//! intended to be used by the CLI and by applications driving a board
//! directly.
//!
//! Public API:
//! - `relay_controller::RelayController`: high-level controller for relay operations
//! - `serial_driver::SerialDriver`: low-level blocking serial driver
//! - `discovery::find_device_port`: helper to locate the board by VID/PID or description
//! - `protocol::CommandFrame`: the 3-byte command frame

pub mod discovery;
pub mod protocol;
pub mod relay_controller;
pub mod serial_driver;

pub use discovery::{find_device_port, list_ports, select_device_port};
pub use protocol::CommandFrame;
pub use relay_controller::{KmtronicRelay, RelayController};
pub use serial_driver::{SerialDriver, SerialTransport};

#[cfg(test)]
mod tests {
    // Basic smoke tests to ensure the crate compiles and the public items are exposed.
    use super::*;

    #[test]
    fn exports_present() {
        let _ = std::any::TypeId::of::<KmtronicRelay>();
        let _ = std::any::TypeId::of::<SerialDriver>();
        let _ = std::any::TypeId::of::<CommandFrame>();
    }
}
