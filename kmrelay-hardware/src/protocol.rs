//! KMTronic relay wire protocol
//!
//! Every state change is one fire-and-forget frame:
//!
//! ```text
//! [0xFF, relay_number, state]
//! ```
//!
//! `relay_number` is one-based (1..=N) and `state` is `0x01` to energize or
//! `0x00` to release. There is no terminator, checksum or acknowledgement.

use kmrelay_core::RelayState;

/// First byte of every command frame
pub const COMMAND_PREFIX: u8 = 0xFF;

/// Length of a command frame in bytes
pub const FRAME_LEN: usize = 3;

/// Wire byte for a relay state
#[inline]
pub fn state_byte(state: RelayState) -> u8 {
    match state {
        RelayState::Energized => 0x01,
        RelayState::DeEnergized => 0x00,
    }
}

/// A single relay command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame([u8; FRAME_LEN]);

impl CommandFrame {
    /// Build a frame for a one-based relay number
    pub fn new(relay_number: u8, state: RelayState) -> Self {
        Self([COMMAND_PREFIX, relay_number, state_byte(state)])
    }

    /// Build a frame for a zero-based channel index
    ///
    /// Returns `None` if the index has no one-based relay number that fits
    /// in a byte.
    pub fn for_channel(index: usize, state: RelayState) -> Option<Self> {
        let relay_number = u8::try_from(index.checked_add(1)?).ok()?;
        Some(Self::new(relay_number, state))
    }

    /// One-based relay number addressed by this frame
    pub fn relay_number(&self) -> u8 {
        self.0[1]
    }

    /// Raw frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_bytes() {
        assert_eq!(state_byte(RelayState::Energized), 0x01);
        assert_eq!(state_byte(RelayState::DeEnergized), 0x00);
    }

    #[test]
    fn test_frame_layout() {
        let frame = CommandFrame::new(2, RelayState::Energized);
        assert_eq!(frame.as_bytes(), &[0xFF, 0x02, 0x01]);
        assert_eq!(frame.as_bytes().len(), FRAME_LEN);
    }

    #[test]
    fn test_for_channel_is_one_based() {
        let frame = CommandFrame::for_channel(0, RelayState::Energized).unwrap();
        assert_eq!(frame.as_bytes(), &[0xFF, 0x01, 0x01]);
        assert_eq!(frame.relay_number(), 1);

        let frame = CommandFrame::for_channel(3, RelayState::DeEnergized).unwrap();
        assert_eq!(frame.as_bytes(), &[0xFF, 0x04, 0x00]);
    }

    #[test]
    fn test_for_channel_out_of_byte_range() {
        assert!(CommandFrame::for_channel(254, RelayState::Energized).is_some());
        assert!(CommandFrame::for_channel(255, RelayState::Energized).is_none());
        assert!(CommandFrame::for_channel(usize::MAX, RelayState::Energized).is_none());
    }
}
