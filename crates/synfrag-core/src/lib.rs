//! Core types for the synfrag fragmentation probe.
//!
//! This crate holds everything the packet-crafting and capture layers share:
//! the test taxonomy, the probe configuration, and the error enumeration
//! with its process-exit-code mapping.

pub mod config;
pub mod error;
pub mod types;

pub use config::ProbeConfig;
pub use error::{Error, Result};
pub use types::{TestType, DEFAULT_TIMEOUT_SECS, SOURCE_PORT};
