//! Serial driver for low-level hardware communication
//!
//! Provides blocking serial I/O with the relay board. Connection parameters
//! come from the board definition and are not configurable.

use kmrelay_core::{BoardConfig, RelayError, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Write;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, error, info};

/// Trait for serial transport abstraction
///
/// This trait enables testing of `RelayController` without real hardware
/// by allowing mock implementations.
pub trait SerialTransport: Send {
    /// Write a complete frame and flush it
    ///
    /// Fails with `WriteFailure` if the transport is not open.
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Release the underlying handle; a no-op when already closed
    fn close(&mut self);

    /// Check if the transport is open
    fn is_open(&self) -> bool;

    /// Get the port path the transport was opened on
    fn port_path(&self) -> Option<&str>;
}

/// Serial driver for hardware communication
pub struct SerialDriver<B: BoardConfig = kmrelay_core::DefaultBoard> {
    port: Option<Box<dyn SerialPort>>,
    port_path: String,
    _board: PhantomData<B>,
}

impl<B: BoardConfig> SerialDriver<B> {
    /// Open the serial device at `port_path` (e.g., "/dev/ttyUSB0", "COM3")
    ///
    /// Blocks for the board's settle delay after opening so the USB-serial
    /// bridge accepts the first frame.
    pub fn open(port_path: &str) -> Result<Self> {
        debug!(
            "Opening serial port: {} ({} baud, 8N1)",
            port_path,
            B::BAUD_RATE
        );

        let port = serialport::new(port_path, B::BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(B::DEFAULT_TIMEOUT_MS))
            .open()
            .map_err(|e| {
                error!("Failed to open serial port {}: {}", port_path, e);
                RelayError::ConnectionFailure {
                    port: port_path.to_string(),
                    reason: e.to_string(),
                }
            })?;

        std::thread::sleep(Duration::from_millis(B::SETTLE_DELAY_MS));

        info!("Serial port {} opened", port_path);

        Ok(Self {
            port: Some(port),
            port_path: port_path.to_string(),
            _board: PhantomData,
        })
    }
}

impl<B: BoardConfig> SerialTransport for SerialDriver<B> {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or_else(|| {
            RelayError::WriteFailure("Serial connection is not open".to_string())
        })?;

        debug!("TX: {:02X?}", frame);

        port.write_all(frame).map_err(|e| {
            error!("Write failed: {}", e);
            RelayError::WriteFailure(e.to_string())
        })?;

        // Each frame goes out on its own
        port.flush().map_err(|e| {
            error!("Flush failed: {}", e);
            RelayError::WriteFailure(format!("Flush failed: {}", e))
        })?;

        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!("Serial port {} closed", self.port_path);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port_path(&self) -> Option<&str> {
        Some(&self.port_path)
    }
}

impl<B: BoardConfig> Drop for SerialDriver<B> {
    fn drop(&mut self) {
        self.close();
    }
}
