//! Status models
//!
//! Serializable snapshots of a controller and its channels, used for
//! diagnostic and JSON output.

use serde::{Deserialize, Serialize};

use crate::types::{RelayChannel, RelayState};
use crate::BoardInfo;

/// Assumed state of a single channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatus {
    /// Zero-based channel index
    pub index: usize,
    /// One-based relay number on the wire
    pub relay: usize,
    /// Last commanded state
    pub state: RelayState,
}

impl From<&RelayChannel> for ChannelStatus {
    fn from(channel: &RelayChannel) -> Self {
        Self {
            index: channel.index(),
            relay: channel.relay_number(),
            state: channel.state(),
        }
    }
}

/// Snapshot of a relay controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerStatus {
    /// Serial port the controller was opened on
    pub port: String,
    /// Board the controller drives
    pub board: BoardInfo,
    /// Whether the transport is still open
    pub connected: bool,
    /// Per-channel state, ascending by index
    pub channels: Vec<ChannelStatus>,
}

impl ControllerStatus {
    /// Number of channels currently assumed energized
    pub fn energized_count(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| c.state.is_energized())
            .count()
    }
}
