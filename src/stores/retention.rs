use chrono::{DateTime, TimeDelta, Utc};

/// Maximum age, in hours, a usage entry may reach before it is discarded,
/// regardless of the window any query asks for.
pub const DEFAULT_RETENTION_HOURS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_age: TimeDelta,
}

impl RetentionPolicy {
    pub fn new(max_age: TimeDelta) -> Self {
        Self { max_age }
    }

    pub fn max_age(&self) -> TimeDelta {
        self.max_age
    }

    /// An entry is expired once it is strictly older than the maximum age,
    /// measured from the reference time supplied by the current query.
    pub fn is_expired(&self, reference: DateTime<Utc>, entry: DateTime<Utc>) -> bool {
        reference - entry > self.max_age
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(TimeDelta::hours(DEFAULT_RETENTION_HOURS))
    }
}
