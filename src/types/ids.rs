//! Newtype wrappers for source identifiers and positions.
//!
//! These keep a source's name and its progress counter from being confused with
//! arbitrary strings and integers elsewhere in a caller's code.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// The name of an input source (for example, an event log channel).
///
/// Ordering is plain byte-wise string ordering; snapshots sort entries by it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceName(pub String);

impl SourceName {
    pub fn new(s: impl Into<String>) -> Self {
        SourceName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SourceName {
    fn from(s: String) -> Self {
        SourceName(s)
    }
}

impl From<&str> for SourceName {
    fn from(s: &str) -> Self {
        SourceName(s.to_string())
    }
}

impl Borrow<str> for SourceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A source-specific progress counter, such as an event record number.
///
/// The engine treats this as opaque: it neither validates nor enforces
/// monotonicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(pub u32);

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Position {
    fn from(n: u32) -> Self {
        Position(n)
    }
}
