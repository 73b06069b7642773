//! Per-card usage history.
//!
//! A [`Ledger`] is not synchronized by itself. The velocity store keeps each
//! one behind the card's own mutex, which is what makes count-then-prune and
//! append atomic with respect to each other.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;

use super::RetentionPolicy;

#[derive(Debug, Default)]
pub struct Ledger {
    /// Timestamps in registration order.
    entries: VecDeque<DateTime<Utc>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub fn append(&mut self, timestamp: DateTime<Utc>) {
        self.entries.push_back(timestamp);
    }

    /// Counts entries whose age relative to `reference` is at most `window`.
    /// Entries registered with a later timestamp than `reference` have a
    /// negative age and are always counted.
    pub fn count_within(&self, reference: DateTime<Utc>, window: TimeDelta) -> usize {
        self.entries
            .iter()
            .filter(|&&entry| reference - entry <= window)
            .count()
    }

    /// Drops every entry the policy considers expired at `reference`.
    /// Returns how many entries were removed.
    pub fn prune(&mut self, reference: DateTime<Utc>, policy: &RetentionPolicy) -> usize {
        let before = self.entries.len();
        self.entries.retain(|&entry| !policy.is_expired(reference, entry));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn ledger_at(offsets_secs: &[i64]) -> Ledger {
        let mut ledger = Ledger::new();
        for &offset in offsets_secs {
            ledger.append(t0() + TimeDelta::seconds(offset));
        }
        ledger
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.count_within(t0(), TimeDelta::hours(1)), 0);
    }

    #[test]
    fn test_count_is_inclusive_of_window_boundary() {
        let ledger = ledger_at(&[0]);
        let reference = t0() + TimeDelta::seconds(90);

        assert_eq!(ledger.count_within(reference, TimeDelta::seconds(90)), 1);
        assert_eq!(ledger.count_within(reference, TimeDelta::seconds(89)), 0);
    }

    #[test]
    fn test_zero_window_counts_only_same_instant() {
        let ledger = ledger_at(&[0, 10, 10]);
        let reference = t0() + TimeDelta::seconds(10);

        assert_eq!(ledger.count_within(reference, TimeDelta::zero()), 2);
    }

    #[test]
    fn test_future_entries_are_counted() {
        // Out-of-order arrival: an entry newer than the query reference
        let ledger = ledger_at(&[0, 600]);
        let reference = t0() + TimeDelta::seconds(60);
        assert_eq!(ledger.count_within(reference, TimeDelta::seconds(30)), 1);
    }

    #[test]
    fn test_prune_removes_only_expired() {
        let mut ledger = ledger_at(&[0, 3600, 7200]);
        let policy = RetentionPolicy::new(TimeDelta::hours(1));

        // At t0+2h: entry at t0 is 2h old (expired), t0+1h is exactly 1h old (kept)
        let removed = ledger.prune(t0() + TimeDelta::hours(2), &policy);

        assert_eq!(removed, 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_prune_handles_out_of_order_entries() {
        let mut ledger = ledger_at(&[7200, 0, 3600, 10]);
        let policy = RetentionPolicy::new(TimeDelta::minutes(90));

        let removed = ledger.prune(t0() + TimeDelta::hours(2), &policy);

        assert_eq!(removed, 2);
        let reference = t0() + TimeDelta::hours(2);
        assert_eq!(ledger.count_within(reference, TimeDelta::hours(24)), 2);
    }

    #[test]
    fn test_prune_everything() {
        let mut ledger = ledger_at(&[0, 1, 2]);
        let removed = ledger.prune(t0() + TimeDelta::hours(11), &RetentionPolicy::default());
        assert_eq!(removed, 3);
        assert!(ledger.is_empty());
    }
}
