//! synfrag probe logic
//!
//! The ten test recipes, the BPF reply filter, the capture listener
//! thread, reply classification, and the single-shot orchestrator that
//! ties them together for one run.

pub mod classify;
pub mod filter;
pub mod listener;
pub mod recipes;
pub mod runner;

pub use classify::reply_matches;
pub use filter::{reply_filter, FILTER_MAX_LEN};
pub use listener::Listener;
pub use runner::{run_probe, Outcome};
