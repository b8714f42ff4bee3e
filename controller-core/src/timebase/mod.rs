//! Fixed-rate time base and the blocking wait built on top of it.
//!
//! The hardware timer overflows roughly 35 times per second and calls
//! [`TimeBase::tick`] from interrupt context. Foreground code blocks by loading
//! a countdown and spinning until the tick handler drains it. [`LogicalClock`]
//! replaces the interrupt on host targets so waits become deterministic.

use core::fmt;
use core::ops::Add;
use core::time::Duration;

use portable_atomic::{AtomicU8, AtomicU16, Ordering};

mod logical;

pub use logical::LogicalClock;

/// Nominal tick rate of the overflow interrupt.
pub const TICKS_PER_SECOND: u8 = 35;

/// Monotonic tick timestamp used for telemetry and status.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Ticks(u32);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(ticks: u32) -> Self {
        Self(ticks)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Nominal wall-clock length of this many ticks.
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_micros(self.0 as u64 * 1_000_000 / TICKS_PER_SECOND as u64)
    }

    /// Converts a wall-clock duration into whole ticks, rounding down.
    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        let ticks = duration.as_micros() * u128::from(TICKS_PER_SECOND) / 1_000_000;
        Self(u32::try_from(ticks).unwrap_or(u32::MAX))
    }

    /// Ticks elapsed since `earlier`, saturating at zero.
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> Self {
        Self(self.0.saturating_sub(earlier.0))
    }
}

impl Add<u16> for Ticks {
    type Output = Self;

    fn add(self, rhs: u16) -> Self::Output {
        Self(self.0.wrapping_add(u32::from(rhs)))
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

/// Tick counter plus the single outstanding wait countdown.
///
/// The countdown has one writer per side: foreground code stores a new value
/// when a wait starts and then only reads it, the tick handler only ever
/// decrements it. Starting a wait while another is in flight overwrites it.
pub struct TimeBase {
    counter: AtomicU8,
    countdown: AtomicU16,
}

impl TimeBase {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU8::new(0),
            countdown: AtomicU16::new(0),
        }
    }

    /// Advances the time base by one period. Call from the tick interrupt.
    pub fn tick(&self) {
        let counter = self.counter.load(Ordering::Relaxed);
        let next = if counter >= TICKS_PER_SECOND {
            0
        } else {
            counter + 1
        };
        self.counter.store(next, Ordering::Relaxed);

        // Plain load/store: the foreground never runs in the middle of this handler.
        let remaining = self.countdown.load(Ordering::Acquire);
        if remaining > 0 {
            self.countdown.store(remaining - 1, Ordering::Release);
        }
    }

    /// Loads the countdown with `periods` ticks, replacing any in-flight wait.
    pub fn start_wait(&self, periods: u16) {
        self.countdown.store(periods, Ordering::Release);
    }

    /// Ticks left on the outstanding wait.
    #[must_use]
    pub fn remaining(&self) -> u16 {
        self.countdown.load(Ordering::Acquire)
    }

    /// Returns `true` when no wait is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.remaining() == 0
    }

    /// Position within the current second, `0..=TICKS_PER_SECOND`.
    #[must_use]
    pub fn counter(&self) -> u8 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Starts a countdown and spins until the tick handler drains it.
    ///
    /// Only returns if the tick interrupt is running.
    pub fn wait(&self, periods: u16) {
        self.start_wait(periods);
        while !self.is_idle() {
            core::hint::spin_loop();
        }
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocking time source consumed by the sequencer and driver loop.
pub trait Clock {
    /// Blocks the caller for `periods` ticks.
    fn wait(&mut self, periods: u16);

    /// Current timestamp.
    fn now(&self) -> Ticks;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_wraps_after_overflow_boundary() {
        let base = TimeBase::new();
        for _ in 0..TICKS_PER_SECOND {
            base.tick();
        }
        assert_eq!(base.counter(), TICKS_PER_SECOND);
        base.tick();
        assert_eq!(base.counter(), 0);
    }

    #[test]
    fn countdown_floors_at_zero() {
        let base = TimeBase::new();
        base.start_wait(2);
        base.tick();
        assert_eq!(base.remaining(), 1);
        base.tick();
        base.tick();
        assert_eq!(base.remaining(), 0);
        assert!(base.is_idle());
    }

    #[test]
    fn new_wait_overwrites_in_flight_countdown() {
        let base = TimeBase::new();
        base.start_wait(150);
        base.tick();
        base.start_wait(5);
        assert_eq!(base.remaining(), 5);
    }

    #[test]
    fn zero_length_wait_returns_immediately() {
        let base = TimeBase::new();
        base.wait(0);
        assert!(base.is_idle());
    }

    #[test]
    fn ticks_convert_to_nominal_durations() {
        assert_eq!(Ticks::new(35).as_duration(), Duration::from_secs(1));
        assert_eq!(Ticks::new(5).as_duration().as_millis(), 142);
        assert_eq!(Ticks::from_duration(Duration::from_secs(3)), Ticks::new(105));
        assert_eq!(Ticks::new(3).saturating_since(Ticks::new(7)), Ticks::ZERO);
    }
}
