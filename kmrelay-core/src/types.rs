//! Core types and data structures for KMRelay

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RelayError;

/// Logical state of a relay coil
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayState {
    /// Coil energized, "Normally Open" contact closed
    Energized,
    /// Coil at rest, "Normally Closed" contact closed
    #[default]
    DeEnergized,
}

impl RelayState {
    /// Returns true for `Energized`
    pub fn is_energized(self) -> bool {
        matches!(self, RelayState::Energized)
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayState::Energized => f.write_str("energized"),
            RelayState::DeEnergized => f.write_str("de-energized"),
        }
    }
}

impl FromStr for RelayState {
    type Err = RelayError;

    /// Parse a relay state
    ///
    /// # Examples
    ///
    /// ```
    /// use kmrelay_core::RelayState;
    ///
    /// assert_eq!("on".parse::<RelayState>().unwrap(), RelayState::Energized);
    /// assert_eq!("NC".parse::<RelayState>().unwrap(), RelayState::DeEnergized);
    /// assert!("half".parse::<RelayState>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" | "energized" | "no" | "1" => Ok(RelayState::Energized),
            "off" | "de-energized" | "de_energized" | "deenergized" | "nc" | "0" => {
                Ok(RelayState::DeEnergized)
            }
            _ => Err(RelayError::InvalidInput(format!(
                "Unknown relay state: '{}'. Valid options: on, off",
                s
            ))),
        }
    }
}

/// One relay line of a board and its last commanded state
///
/// The state is what was last sent successfully; the board has no readback,
/// so it is not verified against the hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayChannel {
    index: usize,
    state: RelayState,
}

impl RelayChannel {
    /// Create a channel at a zero-based index, assumed de-energized
    pub fn new(index: usize) -> Self {
        Self {
            index,
            state: RelayState::DeEnergized,
        }
    }

    /// Zero-based channel index
    pub fn index(&self) -> usize {
        self.index
    }

    /// One-based relay number as addressed on the wire
    pub fn relay_number(&self) -> usize {
        self.index + 1
    }

    /// Last commanded state
    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Record a state after its command frame was sent
    pub fn record(&mut self, state: RelayState) {
        self.state = state;
    }
}

/// Information about an enumerated serial port
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    /// Port path (e.g., /dev/ttyUSB0, COM3)
    pub path: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
    /// USB manufacturer string
    pub manufacturer: Option<String>,
    /// USB product string
    pub product: Option<String>,
    /// USB serial number
    pub serial_number: Option<String>,
    /// Human-readable description
    pub description: String,
}

impl PortInfo {
    /// Create a port with no USB metadata
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: "n/a".to_string(),
            ..Default::default()
        }
    }

    /// Attach USB vendor and product IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }

    /// Set the human-readable description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if the port reports exactly this VID/PID pair
    pub fn matches_usb_ids(&self, vid: u16, pid: u16) -> bool {
        self.vid == Some(vid) && self.pid == Some(pid)
    }
}
