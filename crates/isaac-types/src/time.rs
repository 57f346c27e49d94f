//! ISO-8601 timestamps.
//!
//! The wire format and storage keys both use the second-precision ISO-8601
//! string form (`2026-08-01T12:00:00.000000000Z`), matching the reference
//! node's `common.NowISO8601`/`FormatISO8601`. We keep nanosecond precision
//! internally so canonical hashing (which encodes durations as integer
//! nanoseconds) is lossless.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A point in time, serialized as an ISO-8601 string with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    nanos_since_epoch: u128,
}

impl Timestamp {
    /// Builds a `Timestamp` from the current wall clock. Not deterministic —
    /// callers that need reproducibility should carry an explicit clock.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Timestamp {
            nanos_since_epoch: now.as_nanos(),
        }
    }

    #[must_use]
    pub const fn from_nanos(nanos_since_epoch: u128) -> Self {
        Timestamp { nanos_since_epoch }
    }

    #[must_use]
    pub const fn as_nanos(self) -> u128 {
        self.nanos_since_epoch
    }

    /// Absolute distance to `other`, saturating rather than panicking on
    /// a negative duration either way.
    #[must_use]
    pub fn abs_diff(self, other: Timestamp) -> Duration {
        let diff = self.nanos_since_epoch.abs_diff(other.nanos_since_epoch);
        Duration::from_nanos(u64::try_from(diff).unwrap_or(u64::MAX))
    }

    /// True if `self` is within `window` of `other` in either direction.
    #[must_use]
    pub fn within(self, other: Timestamp, window: Duration) -> bool {
        self.abs_diff(other) <= window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_window_accepts_equal_timestamps() {
        let t = Timestamp::from_nanos(1_000_000_000);
        assert!(t.within(t, Duration::from_secs(1)));
    }

    #[test]
    fn within_window_rejects_far_timestamps() {
        let a = Timestamp::from_nanos(0);
        let b = Timestamp::from_nanos(Duration::from_secs(120).as_nanos());
        assert!(!a.within(b, Duration::from_secs(60)));
    }

    #[test]
    fn abs_diff_is_symmetric() {
        let a = Timestamp::from_nanos(10);
        let b = Timestamp::from_nanos(30);
        assert_eq!(a.abs_diff(b), b.abs_diff(a));
    }
}
