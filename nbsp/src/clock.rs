//! Time sources for the budgeted drain helper.
//!
//! The protocol itself is untimed; only `handle_outgoing_traffic` needs to
//! know when its budget has elapsed. The `Clock` trait keeps that concern
//! injectable so the core stays `no_std` and tests stay deterministic.

use core::time::Duration;

/// A monotonic time source with an arbitrary epoch.
pub trait Clock {
    /// Returns the time elapsed since the clock's epoch.
    fn now(&self) -> Duration;
}

/// A clock anchored to `std::time::Instant` at construction.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct MonotonicClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Creates a clock whose epoch is the moment of construction.
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// A hand-stepped clock for tests.
///
/// Every read returns the current value and then advances it by the
/// configured step, so a loop polling the clock makes deterministic
/// progress without real time passing.
#[derive(Debug)]
pub struct ManualClock {
    current: core::cell::Cell<Duration>,
    step: Duration,
}

impl ManualClock {
    /// Creates a clock stuck at zero.
    pub fn new() -> Self {
        Self::with_step(Duration::ZERO)
    }

    /// Creates a clock that advances by `step` on every read.
    pub fn with_step(step: Duration) -> Self {
        Self {
            current: core::cell::Cell::new(Duration::ZERO),
            step,
        }
    }

    /// Advances the clock by `amount`.
    pub fn advance(&self, amount: Duration) {
        self.current.set(self.current.get() + amount);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let now = self.current.get();
        self.current.set(now + self.step);
        now
    }
}
