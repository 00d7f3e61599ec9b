use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source for playback bookkeeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Arc::new(Mutex::new(Instant::now())) }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Moves to `origin + offset`, never backwards.
    pub fn advance_to(&self, origin: Instant, offset: Duration) {
        let mut now = self.now.lock();
        let target = origin + offset;
        if target > *now {
            *now = target;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        let start = a.now();
        b.advance(Duration::from_millis(250));
        assert_eq!(a.now() - start, Duration::from_millis(250));
    }

    #[test]
    fn advance_to_is_monotonic() {
        let clock = ManualClock::new();
        let origin = clock.now();
        clock.advance_to(origin, Duration::from_secs(2));
        clock.advance_to(origin, Duration::from_secs(1));
        assert_eq!(clock.now() - origin, Duration::from_secs(2));
    }
}
