//! GPIO seam between the sequencer and the board.
//!
//! The sequencer only speaks in logical terms ("button pressed", "apply
//! power"). Implementations of [`ControllerIo`] own the pins and use the line
//! catalog to translate to electrical levels. [`SimulatedLines`] backs the
//! emulator and host tests.

use crate::lines::LineId;

mod sim;

pub use sim::SimulatedLines;

/// Requested change to the status LED.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LedCommand {
    Off,
    On,
    Toggle,
}

impl LedCommand {
    /// LED state after applying this command to `current`.
    #[must_use]
    pub const fn apply(self, current: bool) -> bool {
        match self {
            LedCommand::Off => false,
            LedCommand::On => true,
            LedCommand::Toggle => !current,
        }
    }
}

/// Single output change emitted by the sequencer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputAction {
    Power(bool),
    Led(LedCommand),
    ShutdownRequest(bool),
}

impl OutputAction {
    /// Line touched by this action.
    #[must_use]
    pub const fn line(self) -> LineId {
        match self {
            OutputAction::Power(_) => LineId::PowerSwitch,
            OutputAction::Led(_) => LineId::Led,
            OutputAction::ShutdownRequest(_) => LineId::ShutdownRequest,
        }
    }

    /// Drives the action onto `io`.
    pub fn apply<I: ControllerIo + ?Sized>(self, io: &mut I) {
        match self {
            OutputAction::Power(on) => io.set_power(on),
            OutputAction::Led(command) => io.set_led(command),
            OutputAction::ShutdownRequest(requested) => io.set_shutdown_request(requested),
        }
    }
}

/// Abstraction over the physical lines.
pub trait ControllerIo {
    /// Returns `true` while the user button holds its line low.
    fn button_pressed(&mut self) -> bool;

    /// Returns `true` while the host drives its status line high.
    fn host_alive(&mut self) -> bool;

    /// Applies or removes power through the switch stage.
    fn set_power(&mut self, on: bool);

    /// Updates the status LED.
    fn set_led(&mut self, command: LedCommand);

    /// Raises or drops the graceful-shutdown request to the host.
    fn set_shutdown_request(&mut self, requested: bool);
}

impl<T: ControllerIo + ?Sized> ControllerIo for &mut T {
    fn button_pressed(&mut self) -> bool {
        (**self).button_pressed()
    }

    fn host_alive(&mut self) -> bool {
        (**self).host_alive()
    }

    fn set_power(&mut self, on: bool) {
        (**self).set_power(on);
    }

    fn set_led(&mut self, command: LedCommand) {
        (**self).set_led(command);
    }

    fn set_shutdown_request(&mut self, requested: bool) {
        (**self).set_shutdown_request(requested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_current_led_state() {
        assert!(LedCommand::Toggle.apply(false));
        assert!(!LedCommand::Toggle.apply(true));
        assert!(LedCommand::On.apply(true));
        assert!(!LedCommand::Off.apply(true));
    }

    #[test]
    fn actions_map_to_their_lines() {
        assert_eq!(OutputAction::Power(true).line(), LineId::PowerSwitch);
        assert_eq!(OutputAction::Led(LedCommand::Toggle).line(), LineId::Led);
        assert_eq!(
            OutputAction::ShutdownRequest(false).line(),
            LineId::ShutdownRequest
        );
    }
}
