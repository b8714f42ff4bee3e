//! Build-time wait lengths, in ticks of the 35 Hz time base.
//!
//! The settle wait doubles as button debounce and as the guard that keeps the
//! power-on press from immediately requesting a shutdown.

use core::time::Duration;

use crate::timebase::Ticks;

/// Blocking wait after power is applied (comfortably over 3 s).
pub const SETTLE_TICKS: u16 = 150;
/// Wait between LED toggles while the host shuts down (about 143 ms).
pub const SHUTDOWN_RECHECK_TICKS: u16 = 5;
/// Wait between driver loop iterations (about 57 ms).
pub const LOOP_CADENCE_TICKS: u16 = 2;

/// Wait lengths used by the sequencer and the driver loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SequencerTiming {
    pub settle_ticks: u16,
    pub shutdown_recheck_ticks: u16,
    pub loop_cadence_ticks: u16,
}

impl SequencerTiming {
    pub const DEFAULT: Self = Self {
        settle_ticks: SETTLE_TICKS,
        shutdown_recheck_ticks: SHUTDOWN_RECHECK_TICKS,
        loop_cadence_ticks: LOOP_CADENCE_TICKS,
    };

    #[must_use]
    pub const fn settle(&self) -> Duration {
        Ticks::new(self.settle_ticks as u32).as_duration()
    }

    #[must_use]
    pub const fn shutdown_recheck(&self) -> Duration {
        Ticks::new(self.shutdown_recheck_ticks as u32).as_duration()
    }

    #[must_use]
    pub const fn loop_cadence(&self) -> Duration {
        Ticks::new(self.loop_cadence_ticks as u32).as_duration()
    }
}

impl Default for SequencerTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}
