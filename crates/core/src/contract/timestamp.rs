//! Millisecond-precision stamp time
//!
//! Every version carries the time at which it was committed. Times are signed
//! milliseconds since Unix epoch (1970-01-01 00:00:00 UTC), so historical
//! content authored before 1970 is representable.
//!
//! ## Sentinels
//!
//! - [`Timestamp::UNCOMMITTED`] marks a draft whose final time has not been
//!   assigned yet. It never participates in visibility resolution.
//! - [`Timestamp::LATEST`] is the largest committed time; a position at
//!   `LATEST` sees every committed version on its path.
//!
//! ## Usage
//!
//! Never expose raw arithmetic. Use explicit constructors:
//!
//! ```
//! use chronicle_core::Timestamp;
//!
//! let now = Timestamp::now();
//! let t = Timestamp::from_millis(100);
//! assert!(t < now);
//! assert!(!t.is_uncommitted());
//! ```

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Signed millisecond timestamp
///
/// ## Invariants
///
/// - `UNCOMMITTED` is strictly greater than every committed time
/// - Timestamps are totally ordered
/// - The zero timestamp represents Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Time of a draft that has not been committed
    pub const UNCOMMITTED: Timestamp = Timestamp(i64::MAX);

    /// Latest representable committed time
    pub const LATEST: Timestamp = Timestamp(i64::MAX - 1);

    /// Earliest representable time
    pub const MIN: Timestamp = Timestamp(i64::MIN);

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a timestamp for the current moment
    ///
    /// Returns epoch if the system clock is before Unix epoch.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(duration.as_millis() as i64)
    }

    /// Create a timestamp from milliseconds since epoch
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get milliseconds since Unix epoch
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Check if this is the uncommitted sentinel
    #[inline]
    pub const fn is_uncommitted(&self) -> bool {
        self.0 == i64::MAX
    }

    /// Check if this timestamp is before another
    #[inline]
    pub fn is_before(&self, other: Timestamp) -> bool {
        self.0 < other.0
    }

    /// Check if this timestamp is after another
    #[inline]
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::EPOCH
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_uncommitted() {
            return f.write_str("uncommitted");
        }
        if *self == Timestamp::LATEST {
            return f.write_str("latest");
        }
        match chrono::DateTime::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl From<i64> for Timestamp {
    /// Create from raw milliseconds
    fn from(millis: i64) -> Self {
        Timestamp::from_millis(millis)
    }
}

impl From<Timestamp> for i64 {
    /// Extract raw milliseconds
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

// ============================================================================
// Tests
// ============================================================================
