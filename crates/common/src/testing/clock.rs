use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::time::Clock;

/// A clock that only moves when told to.
///
/// Clones share the same offset, so a test can keep one handle and give
/// another to the component under test.
///
/// ```
/// use std::time::Duration;
///
/// use vocalis_common::testing::MockClock;
/// use vocalis_common::Clock;
///
/// let clock = MockClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(30));
/// assert_eq!(clock.now() - start, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Clock starting at the current instant
    pub fn new() -> Self {
        Self { origin: Instant::now(), offset: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        *self.lock() += by;
    }

    /// Place the clock at `offset` past its origin
    pub fn set_elapsed(&self, offset: Duration) {
        *self.lock() = offset;
    }

    /// How far the clock has been moved
    pub fn elapsed(&self) -> Duration {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Duration> {
        // a panicking test must not poison the other handles
        self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
