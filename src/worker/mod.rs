//! Flush scheduling for checkpoint state.
//!
//! Each checkpoint gets one dedicated worker task that applies updates to the
//! state table serially and decides when to write a snapshot to disk.
//!
//! # Module Structure
//!
//! - [`policy`]: Update-count and time thresholds, with their floors
//! - [`stats`]: Flush counters exposed through the checkpoint handle
//! - [`worker`]: The event loop itself

pub mod policy;
pub mod stats;
#[allow(clippy::module_inception)]
pub mod worker;


pub use policy::{FlushPolicy, MIN_FLUSH_INTERVAL, MIN_MAX_UPDATES};
pub use stats::FlushStats;
pub use worker::{FlushWorker, HANDOFF_CAPACITY};
