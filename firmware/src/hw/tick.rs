//! 35 Hz time base driven by the SysTick exception.

use core::time::Duration;

use controller_core::timebase::{Clock, TICKS_PER_SECOND, TimeBase, Ticks};
use cortex_m::peripheral::SYST;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::exception;

/// Core clock after `embassy_stm32::init` with the default config (HSI16).
const CORE_CLOCK_HZ: u32 = 16_000_000;

/// SysTick reload value for one time-base period.
const SYST_RELOAD: u32 = CORE_CLOCK_HZ / TICKS_PER_SECOND as u32 - 1;

static TIME_BASE: TimeBase = TimeBase::new();

#[exception]
fn SysTick() {
    TIME_BASE.tick();
}

/// Starts SysTick at the time-base rate and returns the clock bound to it.
pub fn start_time_base(mut syst: SYST) -> FirmwareClock {
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(SYST_RELOAD);
    syst.clear_current();
    syst.enable_counter();
    syst.enable_interrupt();
    FirmwareClock { base: &TIME_BASE }
}

/// Blocking clock that spins on the shared [`TimeBase`].
pub struct FirmwareClock {
    base: &'static TimeBase,
}

impl Clock for FirmwareClock {
    fn wait(&mut self, periods: u16) {
        self.base.wait(periods);
    }

    fn now(&self) -> Ticks {
        Ticks::from_duration(Duration::from_micros(
            embassy_time::Instant::now().as_micros(),
        ))
    }
}
