//! KMRelay CLI Library
//!
//! This library provides the core functionality for the `kmrelayctl` tool.
//! Relay control itself lives in `kmrelay-hardware`; this crate adds
//! configuration and output formatting on top of it.

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;
