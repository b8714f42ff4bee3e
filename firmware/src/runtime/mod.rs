use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Input, Output};

use controller_core::driver::Controller;
use controller_core::lines::LineId;

use crate::hw::{self, BoardIo, OUTPUT_SPEED};
use crate::telemetry;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

#[embassy_executor::main]
pub async fn main(_spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PA2,
        PA3,
        PA4,
        ..
    } = hal::init(config);

    // Pin per line must match `mcu_pin` in the catalog.
    let board = BoardIo::new(
        Input::new(PA0, hw::input_pull(LineId::Button)),
        Input::new(PA1, hw::input_pull(LineId::HostStatus)),
        Output::new(PA2, hw::idle_level(LineId::ShutdownRequest), OUTPUT_SPEED),
        Output::new(PA3, hw::idle_level(LineId::PowerSwitch), OUTPUT_SPEED),
        Output::new(PA4, hw::idle_level(LineId::Led), OUTPUT_SPEED),
    );

    let core = cortex_m::Peripherals::take().expect("core peripherals taken before main");
    let clock = hw::start_time_base(core.SYST);

    telemetry::record_boot();

    // Never yields: every wait spins on the SysTick countdown.
    let mut controller: Controller<_, _> = Controller::new(board, clock);
    controller.run_with(telemetry::record_poll);
}
