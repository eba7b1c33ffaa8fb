//! # Clock Capability
//!
//! All "is this meetup still in the future?" decisions go through an injected
//! clock instead of reading the system time in place, so the same code paths
//! stay deterministic under test.

use time::OffsetDateTime;

/// Source of the current instant.
///
/// Held as `Arc<dyn Clock>` in the application state; handlers and services
/// never call `OffsetDateTime::now_utc()` directly.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> OffsetDateTime;
}

/// Production clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock pinned to a fixed instant, for deterministic tests.
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
