//! In-memory state for tracked sources.
//!
//! The [`StateTable`] is the only shared mutable structure in the crate. All
//! mutation goes through the flush worker; readers take point-in-time copies.

pub mod table;

pub use table::StateTable;
