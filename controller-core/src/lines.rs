//! Logical line catalog shared by firmware and host targets.
//!
//! Every digital line the controller touches is described once here: the MCU
//! pin it lands on, its direction, and which electrical level means "asserted".
//! Callers work in terms of logical assertion and use [`LinePolarity`] to turn
//! that into a pin level, so the inverted button and power-switch stages are
//! handled in a single place.

use core::fmt;

/// Identifier for the five logical lines wired to the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineId {
    Button,
    HostStatus,
    ShutdownRequest,
    PowerSwitch,
    Led,
}

impl LineId {
    /// Deterministic index for lookups into [`ALL_LINES`].
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            LineId::Button => 0,
            LineId::HostStatus => 1,
            LineId::ShutdownRequest => 2,
            LineId::PowerSwitch => 3,
            LineId::Led => 4,
        }
    }

    /// Attempts to construct a [`LineId`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(LineId::Button),
            1 => Some(LineId::HostStatus),
            2 => Some(LineId::ShutdownRequest),
            3 => Some(LineId::PowerSwitch),
            4 => Some(LineId::Led),
            _ => None,
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(line_by_id(*self).name)
    }
}

/// Electrical level observed on or driven onto a pin.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PinLevel {
    Low,
    High,
}

impl PinLevel {
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, PinLevel::High)
    }

    #[must_use]
    pub const fn from_high(high: bool) -> Self {
        if high { PinLevel::High } else { PinLevel::Low }
    }
}

/// Which electrical level corresponds to the asserted logical state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LinePolarity {
    ActiveLow,
    ActiveHigh,
}

impl LinePolarity {
    /// Pin level that represents `asserted` for this polarity.
    #[must_use]
    pub const fn level_for(self, asserted: bool) -> PinLevel {
        match self {
            LinePolarity::ActiveHigh => PinLevel::from_high(asserted),
            LinePolarity::ActiveLow => PinLevel::from_high(!asserted),
        }
    }

    /// Logical assertion represented by an observed pin level.
    #[must_use]
    pub const fn asserted_from(self, level: PinLevel) -> bool {
        match self {
            LinePolarity::ActiveHigh => level.is_high(),
            LinePolarity::ActiveLow => !level.is_high(),
        }
    }
}

/// Pin direction as configured during bring-up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineDirection {
    Input { pull_up: bool },
    Output,
}

impl LineDirection {
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, LineDirection::Output)
    }
}

/// Metadata describing how a logical line is routed on the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LineDescriptor {
    pub id: LineId,
    pub name: &'static str,
    pub mcu_pin: &'static str,
    pub direction: LineDirection,
    pub polarity: LinePolarity,
    /// Logical state the line takes at reset (outputs only).
    pub idle_asserted: bool,
}

impl LineDescriptor {
    pub const fn new(
        id: LineId,
        name: &'static str,
        mcu_pin: &'static str,
        direction: LineDirection,
        polarity: LinePolarity,
        idle_asserted: bool,
    ) -> Self {
        Self {
            id,
            name,
            mcu_pin,
            direction,
            polarity,
            idle_asserted,
        }
    }

    /// Pin level the line is driven to (or expected at) after reset.
    #[must_use]
    pub const fn idle_level(&self) -> PinLevel {
        self.polarity.level_for(self.idle_asserted)
    }
}

/// Number of logical lines in [`ALL_LINES`].
pub const LINE_COUNT: usize = 5;

/// Compile-time catalog of every line.
pub const ALL_LINES: [LineDescriptor; LINE_COUNT] = [
    LineDescriptor::new(
        LineId::Button,
        "BUTTON*",
        "PA0",
        LineDirection::Input { pull_up: true },
        LinePolarity::ActiveLow,
        false,
    ),
    LineDescriptor::new(
        LineId::HostStatus,
        "HOST_STATUS",
        "PA1",
        LineDirection::Input { pull_up: false },
        LinePolarity::ActiveHigh,
        false,
    ),
    LineDescriptor::new(
        LineId::ShutdownRequest,
        "HOST_SHUTDOWN",
        "PA2",
        LineDirection::Output,
        LinePolarity::ActiveHigh,
        false,
    ),
    // Drives a P-channel switch stage, so low applies power.
    LineDescriptor::new(
        LineId::PowerSwitch,
        "POWER*",
        "PA3",
        LineDirection::Output,
        LinePolarity::ActiveLow,
        false,
    ),
    LineDescriptor::new(
        LineId::Led,
        "LED",
        "PA4",
        LineDirection::Output,
        LinePolarity::ActiveHigh,
        false,
    ),
];

/// Retrieve line metadata by identifier.
#[must_use]
pub const fn line_by_id(id: LineId) -> LineDescriptor {
    ALL_LINES[id.as_index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_indexed_by_line_id() {
        for (index, line) in ALL_LINES.iter().enumerate() {
            assert_eq!(line.id.as_index(), index);
            assert_eq!(LineId::from_index(index), Some(line.id));
        }
        assert_eq!(LineId::from_index(ALL_LINES.len()), None);
    }

    #[test]
    fn pins_follow_the_board_wiring() {
        // Firmware runtime hands PA0..PA4 to the lines in catalog order.
        let pins: [&str; LINE_COUNT] = core::array::from_fn(|index| ALL_LINES[index].mcu_pin);
        assert_eq!(pins, ["PA0", "PA1", "PA2", "PA3", "PA4"]);
    }

    #[test]
    fn button_reads_pressed_when_low() {
        let button = line_by_id(LineId::Button);
        assert_eq!(button.direction, LineDirection::Input { pull_up: true });
        assert!(button.polarity.asserted_from(PinLevel::Low));
        assert!(!button.polarity.asserted_from(PinLevel::High));
    }

    #[test]
    fn power_switch_idles_high_and_drives_low_when_on() {
        let power = line_by_id(LineId::PowerSwitch);
        assert_eq!(power.idle_level(), PinLevel::High);
        assert_eq!(power.polarity.level_for(true), PinLevel::Low);
    }

    #[test]
    fn active_high_outputs_idle_low() {
        for id in [LineId::ShutdownRequest, LineId::Led] {
            let line = line_by_id(id);
            assert!(line.direction.is_output());
            assert_eq!(line.idle_level(), PinLevel::Low);
            assert_eq!(line.polarity.level_for(true), PinLevel::High);
        }
    }
}
