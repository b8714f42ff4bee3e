use crate::lines::{ALL_LINES, LINE_COUNT, LineId, PinLevel, line_by_id};

use super::{ControllerIo, LedCommand};

/// In-memory pin bank that mirrors the board wiring.
///
/// Inputs start at their released levels (button pulled high, host status
/// low) and outputs at their reset levels.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimulatedLines {
    levels: [PinLevel; LINE_COUNT],
    output_writes: u32,
}

impl SimulatedLines {
    #[must_use]
    pub fn new() -> Self {
        let mut levels = [PinLevel::Low; LINE_COUNT];
        for line in &ALL_LINES {
            levels[line.id.as_index()] = line.idle_level();
        }
        Self {
            levels,
            output_writes: 0,
        }
    }

    /// Electrical level currently on `line`.
    #[must_use]
    pub fn level(&self, line: LineId) -> PinLevel {
        self.levels[line.as_index()]
    }

    /// All line levels indexed by [`LineId::as_index`].
    #[must_use]
    pub const fn levels(&self) -> [PinLevel; LINE_COUNT] {
        self.levels
    }

    /// Logical assertion currently on `line`.
    #[must_use]
    pub fn asserted(&self, line: LineId) -> bool {
        line_by_id(line).polarity.asserted_from(self.level(line))
    }

    /// Holds the button down (line low).
    pub fn press_button(&mut self) {
        self.set_asserted(LineId::Button, true);
    }

    /// Lets the pull-up return the button line high.
    pub fn release_button(&mut self) {
        self.set_asserted(LineId::Button, false);
    }

    /// Drives the host heartbeat line.
    pub fn set_host_alive(&mut self, alive: bool) {
        self.set_asserted(LineId::HostStatus, alive);
    }

    /// Number of output writes performed through [`ControllerIo`].
    #[must_use]
    pub const fn output_writes(&self) -> u32 {
        self.output_writes
    }

    fn set_asserted(&mut self, line: LineId, asserted: bool) {
        self.levels[line.as_index()] = line_by_id(line).polarity.level_for(asserted);
    }

    fn drive(&mut self, line: LineId, asserted: bool) {
        self.output_writes = self.output_writes.saturating_add(1);
        self.set_asserted(line, asserted);
    }
}

impl Default for SimulatedLines {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerIo for SimulatedLines {
    fn button_pressed(&mut self) -> bool {
        self.asserted(LineId::Button)
    }

    fn host_alive(&mut self) -> bool {
        self.asserted(LineId::HostStatus)
    }

    fn set_power(&mut self, on: bool) {
        self.drive(LineId::PowerSwitch, on);
    }

    fn set_led(&mut self, command: LedCommand) {
        let lit = command.apply(self.asserted(LineId::Led));
        self.drive(LineId::Led, lit);
    }

    fn set_shutdown_request(&mut self, requested: bool) {
        self.drive(LineId::ShutdownRequest, requested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_released_and_powered_down() {
        let lines = SimulatedLines::new();
        assert_eq!(lines.level(LineId::Button), PinLevel::High);
        assert_eq!(lines.level(LineId::HostStatus), PinLevel::Low);
        assert_eq!(lines.level(LineId::PowerSwitch), PinLevel::High);
        assert!(!lines.asserted(LineId::Led));
        assert_eq!(lines.output_writes(), 0);
    }

    #[test]
    fn power_on_pulls_switch_low() {
        let mut lines = SimulatedLines::new();
        lines.set_power(true);
        assert_eq!(lines.level(LineId::PowerSwitch), PinLevel::Low);
        assert!(lines.asserted(LineId::PowerSwitch));
    }

    #[test]
    fn button_press_reads_low() {
        let mut lines = SimulatedLines::new();
        lines.press_button();
        assert_eq!(lines.level(LineId::Button), PinLevel::Low);
        assert!(lines.button_pressed());
        lines.release_button();
        assert!(!lines.button_pressed());
    }

    #[test]
    fn led_toggle_tracks_pin_level() {
        let mut lines = SimulatedLines::new();
        lines.set_led(LedCommand::Toggle);
        assert_eq!(lines.level(LineId::Led), PinLevel::High);
        lines.set_led(LedCommand::Toggle);
        assert_eq!(lines.level(LineId::Led), PinLevel::Low);
        assert_eq!(lines.output_writes(), 2);
    }
}
