//! Board definitions and configuration
//!
//! Each supported relay board implements the `BoardConfig` trait with its
//! channel count, USB identifiers and serial parameters. Everything is
//! resolved at compile time; `BoardInfo` is the runtime snapshot used for
//! diagnostics and serialized output.
//!
//! Note: Actual hardware I/O is in the `kmrelay-hardware` crate. This module only
//! contains board specifications.

/// Hardware board configuration trait
///
/// # Example
///
/// ```
/// use kmrelay_core::board::{BoardConfig, KmtronicUsb4Relay};
///
/// const CHANNELS: usize = KmtronicUsb4Relay::CHANNEL_COUNT;
/// const NAME: &str = KmtronicUsb4Relay::NAME;
/// ```
pub trait BoardConfig: Send + Sync + 'static {
    /// Human-readable board name
    const NAME: &'static str;

    /// Number of relay channels on this board
    const CHANNEL_COUNT: usize;

    /// USB Vendor ID for device detection
    const USB_VID: u16;

    /// USB Product ID for device detection
    const USB_PID: u16;

    /// Serial communication baud rate
    const BAUD_RATE: u32;

    /// Read/write timeout in milliseconds
    const DEFAULT_TIMEOUT_MS: u64;

    /// Pause after opening the port before the first write
    ///
    /// The USB-serial bridge drops bytes written immediately after open.
    const SETTLE_DELAY_MS: u64;

    /// Lowercase port description fragments accepted when no port matches
    /// the VID/PID pair
    const FALLBACK_DESCRIPTIONS: &'static [&'static str];
}

/// KMTronic USB 4 Relay board
///
/// - 4 relay channels, addressed 1-4 on the wire
/// - USB VID: 0x1337, PID: 0x0088 (FTDI bridge with custom IDs)
/// - 9600 baud, 8N1
pub struct KmtronicUsb4Relay;

impl BoardConfig for KmtronicUsb4Relay {
    const NAME: &'static str = "KMTronic USB 4 Relay";
    const CHANNEL_COUNT: usize = 4;
    const USB_VID: u16 = 0x1337;
    const USB_PID: u16 = 0x0088;
    const BAUD_RATE: u32 = 9600;
    const DEFAULT_TIMEOUT_MS: u64 = 1000;
    const SETTLE_DELAY_MS: u64 = 100;
    const FALLBACK_DESCRIPTIONS: &'static [&'static str] = &["ftdi", "ch340", "usb serial"];
}

/// Default board type used throughout the codebase
pub type DefaultBoard = KmtronicUsb4Relay;

/// Runtime board information (non-generic)
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoardInfo {
    /// Human-readable board name
    pub name: String,
    /// Number of relay channels
    pub channel_count: usize,
    /// USB Vendor ID
    pub usb_vid: u16,
    /// USB Product ID
    pub usb_pid: u16,
    /// Serial communication baud rate
    pub baud_rate: u32,
    /// Read/write timeout in milliseconds
    pub timeout_ms: u64,
}

impl BoardInfo {
    /// Snapshot the constants of a board configuration
    pub fn of<B: BoardConfig>() -> Self {
        Self {
            name: B::NAME.to_string(),
            channel_count: B::CHANNEL_COUNT,
            usb_vid: B::USB_VID,
            usb_pid: B::USB_PID,
            baud_rate: B::BAUD_RATE,
            timeout_ms: B::DEFAULT_TIMEOUT_MS,
        }
    }

    /// Validate a zero-based channel index against this board's channel count
    ///
    /// # Errors
    ///
    /// Returns `InvalidChannel` if the index is `>= channel_count`
    ///
    /// # Examples
    ///
    /// ```
    /// use kmrelay_core::board::{BoardInfo, KmtronicUsb4Relay};
    ///
    /// let board = BoardInfo::of::<KmtronicUsb4Relay>();
    /// assert!(board.validate_channel(0).is_ok());
    /// assert!(board.validate_channel(3).is_ok());
    /// assert!(board.validate_channel(4).is_err());
    /// ```
    pub fn validate_channel(&self, channel: usize) -> crate::Result<()> {
        validate_channel(channel, self.channel_count)
    }
}

/// Check that `channel` addresses one of `channel_count` channels
pub fn validate_channel(channel: usize, channel_count: usize) -> crate::Result<()> {
    if channel >= channel_count {
        return Err(crate::RelayError::InvalidChannel {
            channel,
            channel_count,
        });
    }
    Ok(())
}
