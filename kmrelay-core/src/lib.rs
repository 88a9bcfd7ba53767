//! KMRelay Core Library
//!
//! Shared types, board definitions and errors for the KMRelay project.
//! This crate is used by both the hardware and CLI components.

pub mod board;
pub mod error;
pub mod status;
pub mod types;

// Re-export commonly used types
pub use board::*;
pub use error::*;
pub use status::{ChannelStatus, ControllerStatus};
pub use types::*;
