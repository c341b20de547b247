use std::sync::Arc;
use std::time::Instant;

/// Source of monotonic instants
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock handle shared between components
pub type SharedClock = Arc<dyn Clock>;

/// The process monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Boxed into a [`SharedClock`]
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn test_shared_clock_delegates() {
        let clock: SharedClock = SystemClock::shared();
        let before = Instant::now();
        assert!(clock.now() >= before);
    }
}
