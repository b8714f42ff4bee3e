//! Shared status surface for the console.
//!
//! [`StatusSnapshot`] captures the power state together with the electrical
//! level of every line; [`StatusFormatter`] keeps the textual rendering
//! consistent across front-ends.

use core::fmt;
use core::time::Duration;

use crate::lines::{ALL_LINES, LINE_COUNT, LineDirection, LineId, PinLevel, line_by_id};
use crate::sequencer::PowerState;
use crate::timebase::Ticks;

/// Sampled level for a single line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineSample {
    pub id: LineId,
    pub level: PinLevel,
}

impl LineSample {
    #[must_use]
    pub const fn new(id: LineId, level: PinLevel) -> Self {
        Self { id, level }
    }

    /// Logical assertion implied by the sampled level.
    #[must_use]
    pub const fn is_asserted(&self) -> bool {
        line_by_id(self.id).polarity.asserted_from(self.level)
    }
}

/// Snapshot of everything the `status` command reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub state: PowerState,
    pub uptime: Ticks,
    pub lines: [LineSample; LINE_COUNT],
}

impl StatusSnapshot {
    /// Builds a snapshot from raw pin levels indexed by [`LineId::as_index`].
    #[must_use]
    pub fn new(state: PowerState, uptime: Ticks, levels: [PinLevel; LINE_COUNT]) -> Self {
        let mut lines = [LineSample::new(LineId::Button, PinLevel::High); LINE_COUNT];
        for (slot, line) in lines.iter_mut().zip(ALL_LINES.iter()) {
            *slot = LineSample::new(line.id, levels[line.id.as_index()]);
        }
        Self {
            state,
            uptime,
            lines,
        }
    }

    #[must_use]
    pub fn sample(&self, id: LineId) -> LineSample {
        self.lines[id.as_index()]
    }
}

/// Helper that renders a [`StatusSnapshot`] into human-readable lines.
#[derive(Clone, Copy, Debug)]
pub struct StatusFormatter<'a> {
    snapshot: &'a StatusSnapshot,
}

impl<'a> StatusFormatter<'a> {
    #[must_use]
    pub const fn new(snapshot: &'a StatusSnapshot) -> Self {
        Self { snapshot }
    }

    /// Writes the state line (e.g. `state powered-on uptime=+4.3s`).
    pub fn write_state_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        write!(writer, "state {} uptime=", self.snapshot.state)?;
        write_duration(writer, self.snapshot.uptime.as_duration())?;
        write!(writer, " ({})", self.snapshot.uptime)
    }

    /// Writes the input line (e.g. `inputs BUTTON*=released HOST_STATUS=asserted`).
    pub fn write_inputs_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        writer.write_str("inputs")?;
        self.write_samples(writer, false)
    }

    /// Writes the output line (e.g. `outputs POWER*=asserted(low) ...`).
    pub fn write_outputs_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        writer.write_str("outputs")?;
        self.write_samples(writer, true)
    }

    fn write_samples<W: fmt::Write>(&self, writer: &mut W, outputs: bool) -> fmt::Result {
        for sample in &self.snapshot.lines {
            let line = line_by_id(sample.id);
            if line.direction.is_output() != outputs {
                continue;
            }
            let state = if sample.is_asserted() {
                "asserted"
            } else {
                "released"
            };
            write!(writer, " {}={}", line.name, state)?;
            if matches!(line.direction, LineDirection::Output) {
                writer.write_str(if sample.level.is_high() {
                    "(high)"
                } else {
                    "(low)"
                })?;
            }
        }
        Ok(())
    }
}

fn write_duration<W: fmt::Write>(writer: &mut W, duration: Duration) -> fmt::Result {
    if duration >= Duration::from_secs(1) {
        let millis = duration.as_millis();
        let seconds = millis / 1_000;
        let tenths = (millis % 1_000) / 100;
        write!(writer, "+{seconds}.{tenths}s")
    } else {
        write!(writer, "+{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn powered_snapshot() -> StatusSnapshot {
        let mut levels = [PinLevel::Low; LINE_COUNT];
        levels[LineId::Button.as_index()] = PinLevel::High;
        levels[LineId::HostStatus.as_index()] = PinLevel::High;
        levels[LineId::ShutdownRequest.as_index()] = PinLevel::Low;
        levels[LineId::PowerSwitch.as_index()] = PinLevel::Low;
        levels[LineId::Led.as_index()] = PinLevel::High;
        StatusSnapshot::new(PowerState::PoweredOn, Ticks::new(152), levels)
    }

    #[test]
    fn state_line_reports_uptime() {
        let snapshot = powered_snapshot();
        let mut out: String<64> = String::new();
        StatusFormatter::new(&snapshot)
            .write_state_line(&mut out)
            .unwrap();
        assert_eq!(out.as_str(), "state powered-on uptime=+4.3s (152t)");
    }

    #[test]
    fn inputs_line_uses_logical_assertion() {
        let snapshot = powered_snapshot();
        let mut out: String<64> = String::new();
        StatusFormatter::new(&snapshot)
            .write_inputs_line(&mut out)
            .unwrap();
        assert_eq!(out.as_str(), "inputs BUTTON*=released HOST_STATUS=asserted");
    }

    #[test]
    fn outputs_line_shows_inverted_power_switch() {
        let snapshot = powered_snapshot();
        let mut out: String<128> = String::new();
        StatusFormatter::new(&snapshot)
            .write_outputs_line(&mut out)
            .unwrap();
        assert_eq!(
            out.as_str(),
            "outputs HOST_SHUTDOWN=released(low) POWER*=asserted(low) LED=asserted(high)"
        );
        assert!(snapshot.sample(LineId::PowerSwitch).is_asserted());
    }
}
