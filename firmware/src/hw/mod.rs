//! Board wiring for the STM32G0 controller.
//!
//! [`BoardIo`] maps the logical lines of `controller-core` onto Embassy GPIO
//! drivers, converting through each line's catalog polarity.

mod tick;

pub use tick::start_time_base;

use controller_core::io::{ControllerIo, LedCommand};
use controller_core::lines::{LineDirection, LineId, PinLevel, line_by_id};
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};

/// GPIO drivers for the five controller lines.
pub struct BoardIo<'d> {
    button: Input<'d>,
    host_status: Input<'d>,
    shutdown_request: Output<'d>,
    power_switch: Output<'d>,
    led: Output<'d>,
}

impl<'d> BoardIo<'d> {
    pub fn new(
        button: Input<'d>,
        host_status: Input<'d>,
        shutdown_request: Output<'d>,
        power_switch: Output<'d>,
        led: Output<'d>,
    ) -> Self {
        Self {
            button,
            host_status,
            shutdown_request,
            power_switch,
            led,
        }
    }

    fn input_asserted(input: &Input<'d>, line: LineId) -> bool {
        line_by_id(line)
            .polarity
            .asserted_from(PinLevel::from_high(input.is_high()))
    }

    fn drive(output: &mut Output<'d>, line: LineId, asserted: bool) {
        output.set_level(to_gpio(line_by_id(line).polarity.level_for(asserted)));
    }
}

impl ControllerIo for BoardIo<'_> {
    fn button_pressed(&mut self) -> bool {
        Self::input_asserted(&self.button, LineId::Button)
    }

    fn host_alive(&mut self) -> bool {
        Self::input_asserted(&self.host_status, LineId::HostStatus)
    }

    fn set_power(&mut self, on: bool) {
        Self::drive(&mut self.power_switch, LineId::PowerSwitch, on);
    }

    fn set_led(&mut self, command: LedCommand) {
        let lit = line_by_id(LineId::Led)
            .polarity
            .asserted_from(PinLevel::from_high(self.led.is_set_high()));
        Self::drive(&mut self.led, LineId::Led, command.apply(lit));
    }

    fn set_shutdown_request(&mut self, requested: bool) {
        Self::drive(&mut self.shutdown_request, LineId::ShutdownRequest, requested);
    }
}

/// Reset level for an output line, from the catalog.
pub fn idle_level(line: LineId) -> Level {
    to_gpio(line_by_id(line).idle_level())
}

/// Input bias for an input line, from the catalog.
pub fn input_pull(line: LineId) -> Pull {
    match line_by_id(line).direction {
        LineDirection::Input { pull_up: true } => Pull::Up,
        _ => Pull::None,
    }
}

/// Slew rate for every output; all lines are slow logic signals.
pub const OUTPUT_SPEED: Speed = Speed::Low;

const fn to_gpio(level: PinLevel) -> Level {
    match level {
        PinLevel::Low => Level::Low,
        PinLevel::High => Level::High,
    }
}
