//! Flush trigger policy.
//!
//! The worker flushes when either enough updates have accumulated or enough
//! time has passed since the last flush, whichever comes first.
//!
//! # Floors
//!
//! - **Max updates**: at least 1 (every update may flush, never "never")
//! - **Flush interval**: at least 1 second
//!
//! Values below a floor are clamped rather than rejected.

use std::time::Duration;

/// Smallest accepted update-count threshold.
pub const MIN_MAX_UPDATES: usize = 1;

/// Smallest accepted flush interval.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Default update-count threshold.
const DEFAULT_MAX_UPDATES: usize = 10;

/// Default flush interval (5 seconds).
const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 5;

/// Environment variable overriding the update-count threshold.
pub const MAX_UPDATES_ENV: &str = "CHECKPOINT_MAX_UPDATES";

/// Environment variable overriding the flush interval, in whole seconds.
pub const FLUSH_INTERVAL_ENV: &str = "CHECKPOINT_FLUSH_INTERVAL_SECS";

/// When the flush worker writes the state table to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    max_updates: usize,
    flush_interval: Duration,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        FlushPolicy {
            max_updates: DEFAULT_MAX_UPDATES,
            flush_interval: Duration::from_secs(DEFAULT_FLUSH_INTERVAL_SECS),
        }
    }
}

impl FlushPolicy {
    /// Creates a policy, clamping both thresholds to their floors.
    pub fn new(max_updates: usize, flush_interval: Duration) -> Self {
        FlushPolicy {
            max_updates: max_updates.max(MIN_MAX_UPDATES),
            flush_interval: flush_interval.max(MIN_FLUSH_INTERVAL),
        }
    }

    /// Creates a `FlushPolicy` from environment variables.
    ///
    /// Reads `CHECKPOINT_MAX_UPDATES` and `CHECKPOINT_FLUSH_INTERVAL_SECS`.
    /// Missing or unparseable values use defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_updates = lookup(MAX_UPDATES_ENV)
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.max_updates);

        let flush_interval = lookup(FLUSH_INTERVAL_ENV)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.flush_interval);

        Self::new(max_updates, flush_interval)
    }

    /// Number of updates that triggers a flush.
    pub fn max_updates(&self) -> usize {
        self.max_updates
    }

    /// Longest time between flush attempts.
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Returns `true` once `pending_updates` has reached the threshold.
    pub fn count_reached(&self, pending_updates: usize) -> bool {
        pending_updates >= self.max_updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    proptest! {
        #[test]
        fn new_never_goes_below_floors(max_updates in 0usize..1000, millis in 0u64..10_000) {
            let policy = FlushPolicy::new(max_updates, Duration::from_millis(millis));

            prop_assert!(policy.max_updates() >= MIN_MAX_UPDATES);
            prop_assert!(policy.flush_interval() >= MIN_FLUSH_INTERVAL);
        }

        #[test]
        fn values_above_floors_are_kept(max_updates in 1usize..1000, secs in 1u64..86_400) {
            let policy = FlushPolicy::new(max_updates, Duration::from_secs(secs));

            prop_assert_eq!(policy.max_updates(), max_updates);
            prop_assert_eq!(policy.flush_interval(), Duration::from_secs(secs));
        }
    }

    #[test]
    fn default_policy_has_expected_values() {
        let policy = FlushPolicy::default();

        assert_eq!(policy.max_updates(), 10);
        assert_eq!(policy.flush_interval(), Duration::from_secs(5));
    }

    #[test]
    fn zero_max_updates_clamps_to_one() {
        let policy = FlushPolicy::new(0, Duration::from_secs(60));
        assert_eq!(policy.max_updates(), 1);
    }

    #[test]
    fn sub_second_interval_clamps_to_one_second() {
        let policy = FlushPolicy::new(5, Duration::from_millis(10));
        assert_eq!(policy.flush_interval(), Duration::from_secs(1));
    }

    #[test]
    fn count_reached_at_threshold() {
        let policy = FlushPolicy::new(3, Duration::from_secs(1));

        assert!(!policy.count_reached(0));
        assert!(!policy.count_reached(2));
        assert!(policy.count_reached(3));
        assert!(policy.count_reached(4));
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let policy = FlushPolicy::from_lookup(lookup_from(&[
            (MAX_UPDATES_ENV, "100"),
            (FLUSH_INTERVAL_ENV, " 30 "),
        ]));

        assert_eq!(policy.max_updates(), 100);
        assert_eq!(policy.flush_interval(), Duration::from_secs(30));
    }

    #[test]
    fn from_lookup_falls_back_on_garbage() {
        let policy = FlushPolicy::from_lookup(lookup_from(&[
            (MAX_UPDATES_ENV, "lots"),
            (FLUSH_INTERVAL_ENV, "-1"),
        ]));

        assert_eq!(policy, FlushPolicy::default());
    }

    #[test]
    fn from_lookup_accepts_largest_interval() {
        let policy =
            FlushPolicy::from_lookup(lookup_from(&[(FLUSH_INTERVAL_ENV, "18446744073709551615")]));

        assert_eq!(policy.flush_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn from_lookup_clamps_zero_values() {
        let policy = FlushPolicy::from_lookup(lookup_from(&[
            (MAX_UPDATES_ENV, "0"),
            (FLUSH_INTERVAL_ENV, "0"),
        ]));

        assert_eq!(policy.max_updates(), 1);
        assert_eq!(policy.flush_interval(), Duration::from_secs(1));
    }
}
