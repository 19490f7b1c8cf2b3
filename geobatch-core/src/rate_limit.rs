use std::{
    fmt,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(1);

/// Source of monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Enforces a minimum delay between the starts of two
/// consecutive provider calls.
///
/// All calls issued through the same limiter share the budget,
/// no matter which resolver or thread issues them. Callers that
/// have to wait keep the limiter locked while sleeping, i.e.
/// concurrent callers are served one after another.
pub struct RateLimiter {
    min_delay: Duration,
    last_call_started: Mutex<Option<Instant>>,
    clock: Box<dyn Clock>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self::with_clock(min_delay, SystemClock)
    }

    pub fn with_clock<C>(min_delay: Duration, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        Self {
            min_delay,
            last_call_started: Mutex::new(None),
            clock: Box::new(clock),
        }
    }

    pub fn shared(min_delay: Duration) -> Arc<Self> {
        Arc::new(Self::new(min_delay))
    }

    pub const fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Blocks until the next call is allowed to start and
    /// returns the instant at which it starts.
    pub fn acquire(&self) -> Instant {
        let mut last_call_started = self.last_call_started.lock();
        if let Some(last) = *last_call_started {
            let earliest = last + self.min_delay;
            let now = self.clock.now();
            if now < earliest {
                let wait = earliest - now;
                log::trace!("Waiting {wait:?} before the next provider call");
                self.clock.sleep(wait);
            }
        }
        let started = self.clock.now();
        debug_assert!(
            last_call_started.map_or(true, |last| started.duration_since(last) >= self.min_delay),
            "Rate limit violated"
        );
        *last_call_started = Some(started);
        started
    }

    /// Runs `call` as soon as the limiter admits it.
    pub fn call<T>(&self, call: impl FnOnce() -> T) -> T {
        self.acquire();
        call()
    }

    /// Sleeps using the clock of this limiter without
    /// touching the rate limit budget.
    pub fn pause(&self, duration: Duration) {
        self.clock.sleep(duration);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DELAY)
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("min_delay", &self.min_delay)
            .field("last_call_started", &*self.last_call_started.lock())
            .finish_non_exhaustive()
    }
}
