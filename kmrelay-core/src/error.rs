//! Error types for the KMRelay system

use thiserror::Error;

/// Core error type for relay operations
#[derive(Error, Debug)]
pub enum RelayError {
    /// Auto-discovery found no matching serial port
    #[error("Device not found")]
    DeviceNotFound,

    /// A port was selected but could not be opened
    #[error("Failed to connect to relay board on {port}: {reason}")]
    ConnectionFailure { port: String, reason: String },

    /// Writing a command frame failed or the handle is not open
    #[error("Write failed: {0}")]
    WriteFailure(String),

    /// Channel operation attempted after the controller was closed
    #[error("Relay controller is not connected")]
    NotConnected,

    /// Channel index out of range
    #[error("Channel out of range: {channel} (must be 0-{max})", max = .channel_count.saturating_sub(1))]
    InvalidChannel { channel: usize, channel_count: usize },

    /// Serial port enumeration failed
    #[error("Failed to enumerate serial ports: {0}")]
    Enumeration(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
