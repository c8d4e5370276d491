//! Shared test utilities and arbitrary generators for property-based testing.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use proptest::prelude::*;

use crate::persistence::snapshot::Snapshot;
use crate::types::{Position, SourceName, SourceState};

pub fn arb_source_name() -> impl Strategy<Value = SourceName> {
    prop_oneof![
        Just(SourceName::from("Application")),
        Just(SourceName::from("Security")),
        Just(SourceName::from("System")),
        "[A-Za-z][A-Za-z0-9/ -]{0,30}".prop_map(SourceName::from),
    ]
}

pub fn arb_position() -> impl Strategy<Value = Position> {
    any::<u32>().prop_map(Position)
}

pub fn arb_datetime() -> impl Strategy<Value = DateTime<Utc>> {
    // Year 2000-2100, with sub-second precision to exercise timestamp encoding.
    (946684800i64..4102444800i64, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap())
}

pub fn arb_source_state() -> impl Strategy<Value = SourceState> {
    (arb_source_name(), arb_position(), arb_datetime()).prop_map(
        |(name, position, observed_at)| SourceState {
            name,
            position,
            observed_at,
        },
    )
}

/// Snapshots with unique source names, as the state table produces.
pub fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    (
        arb_datetime(),
        prop::collection::hash_map(arb_source_name(), (arb_position(), arb_datetime()), 0..20),
    )
        .prop_map(|(saved_at, states)| {
            Snapshot::from_states(
                saved_at,
                states
                    .into_iter()
                    .map(|(name, (position, observed_at))| SourceState {
                        name,
                        position,
                        observed_at,
                    }),
            )
        })
}

/// Polls `condition` until it holds, failing the test after `limit`.
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) {
    let poll = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    if tokio::time::timeout(limit, poll).await.is_err() {
        panic!("condition not met within {:?}", limit);
    }
}

/// Runs `fut` and fails the test if it does not complete within `limit`.
pub async fn within<F: Future>(limit: Duration, fut: F) -> F::Output {
    match tokio::time::timeout(limit, fut).await {
        Ok(output) => output,
        Err(_) => panic!("operation did not complete within {:?}", limit),
    }
}
