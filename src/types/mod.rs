//! Core domain types for source checkpointing.

pub mod ids;
pub mod state;

pub use ids::{Position, SourceName};
pub use state::SourceState;
