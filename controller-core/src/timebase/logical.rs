//! Deterministic clock for host builds and tests.

use super::{Clock, TimeBase, Ticks};

/// Host-side stand-in for the timer interrupt.
///
/// [`advance`](Self::advance) plays the role of the overflow interrupt and a
/// [`Clock::wait`] drives ticks until the countdown drains, so a blocking wait
/// costs exactly `periods` ticks of logical time.
pub struct LogicalClock {
    base: TimeBase,
    elapsed: Ticks,
    last_wait: Option<u16>,
    waits_started: u32,
}

impl LogicalClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base: TimeBase::new(),
            elapsed: Ticks::ZERO,
            last_wait: None,
            waits_started: 0,
        }
    }

    /// Delivers `ticks` tick events without starting a wait.
    pub fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.base.tick();
            self.elapsed = self.elapsed + 1;
        }
    }

    /// Underlying counters, exposed for inspection.
    #[must_use]
    pub const fn time_base(&self) -> &TimeBase {
        &self.base
    }

    /// Length of the most recently started wait.
    #[must_use]
    pub const fn last_wait(&self) -> Option<u16> {
        self.last_wait
    }

    /// Number of waits started since construction.
    #[must_use]
    pub const fn waits_started(&self) -> u32 {
        self.waits_started
    }
}

impl Default for LogicalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for LogicalClock {
    fn wait(&mut self, periods: u16) {
        self.base.start_wait(periods);
        self.last_wait = Some(periods);
        self.waits_started = self.waits_started.saturating_add(1);
        while !self.base.is_idle() {
            self.advance(1);
        }
    }

    fn now(&self) -> Ticks {
        self.elapsed
    }
}
