//! Wall-clock abstraction for change metadata.
//!
//! Every [`Change`](crate::change::Change) records the time its author created
//! it, and [`Document::put_timestamp_now`](crate::Document::put_timestamp_now)
//! stores the current time as a value. Neither participates in ordering: the
//! merge engine orders operations purely by Lamport counters and actor ids.
//!
//! The [`Clock`] trait lets tests pin time so that change hashes are
//! reproducible.
//!
//! ```
//! use replidoc::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! assert!(clock.now_millis() > 0);
//! ```

use std::fmt::Debug;

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// A time provider returning milliseconds since the Unix epoch.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Production clock backed by [`chrono::Utc`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Test clock that starts at a fixed instant and advances by one millisecond
/// per reading.
///
/// Two documents driven by clocks created with the same start value author
/// byte-identical changes for identical edit sequences, which keeps change
/// hashes stable across test runs.
///
/// ```ignore
/// use replidoc::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1000);
/// assert_eq!(clock.now_millis(), 1000);
/// assert_eq!(clock.now_millis(), 1001);
/// clock.set(50);
/// assert_eq!(clock.now_millis(), 50);
/// ```
#[cfg(any(test, feature = "testing"))]
pub struct FixedClock {
    millis: Mutex<i64>,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a clock whose first reading is `millis`.
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Mutex::new(millis),
        }
    }

    /// Move the clock to a specific time.
    pub fn set(&self, millis: i64) {
        *self.lock() = millis;
    }

    /// Current value without advancing.
    pub fn get(&self) -> i64 {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, i64> {
        // A poisoned test clock still holds a usable integer.
        self.millis.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        let mut millis = self.lock();
        let now = *millis;
        *millis += 1;
        now
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedClock")
            .field("millis", &self.get())
            .finish()
    }
}
