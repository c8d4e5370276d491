//! The per-source state record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{Position, SourceName};

/// The last known read position for one input source.
///
/// An update for a source replaces this record wholesale; fields are never
/// merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceState {
    /// Unique key within the state table.
    pub name: SourceName,

    /// How far the source has been processed.
    #[serde(alias = "record_number")]
    pub position: Position,

    /// When the record at `position` was observed.
    #[serde(alias = "timestamp")]
    pub observed_at: DateTime<Utc>,
}

impl SourceState {
    pub fn new(
        name: impl Into<SourceName>,
        position: impl Into<Position>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        SourceState {
            name: name.into(),
            position: position.into(),
            observed_at,
        }
    }
}
