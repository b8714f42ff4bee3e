//! Driver loop that owns the sequencer and paces it.
//!
//! Each iteration polls the sequencer once and then blocks for the loop
//! cadence. On hardware [`Controller::run_with`] never returns; host tooling
//! calls [`Controller::step`] directly against a logical clock.

use crate::io::ControllerIo;
use crate::sequencer::{PollReport, PowerSequencer, SequencerTiming};
use crate::telemetry::{TELEMETRY_RING_CAPACITY, TelemetryRecorder};
use crate::timebase::{Clock, Ticks};

/// Power controller: sequencer, board lines, clock and telemetry.
pub struct Controller<I, C, const TELEMETRY: usize = TELEMETRY_RING_CAPACITY>
where
    I: ControllerIo,
    C: Clock,
{
    sequencer: PowerSequencer,
    io: I,
    clock: C,
    telemetry: TelemetryRecorder<TELEMETRY>,
    iterations: u32,
}

impl<I, C, const TELEMETRY: usize> Controller<I, C, TELEMETRY>
where
    I: ControllerIo,
    C: Clock,
{
    pub fn new(io: I, clock: C) -> Self {
        Self::with_timing(io, clock, SequencerTiming::DEFAULT)
    }

    pub fn with_timing(io: I, clock: C, timing: SequencerTiming) -> Self {
        Self {
            sequencer: PowerSequencer::with_timing(timing),
            io,
            clock,
            telemetry: TelemetryRecorder::new(),
            iterations: 0,
        }
    }

    pub fn sequencer(&self) -> &PowerSequencer {
        &self.sequencer
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn telemetry(&self) -> &TelemetryRecorder<TELEMETRY> {
        &self.telemetry
    }

    /// Loop iterations completed so far.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Current timestamp from the clock.
    pub fn now(&self) -> Ticks {
        self.clock.now()
    }

    /// One loop iteration: poll, then wait out the cadence.
    pub fn step(&mut self) -> PollReport {
        let started_at = self.clock.now();
        let report = self.sequencer.poll(&mut self.io, &mut self.clock);
        self.telemetry.record_poll(&report, started_at);

        let cadence = self.sequencer.timing().loop_cadence_ticks;
        self.clock.wait(cadence);
        self.iterations = self.iterations.wrapping_add(1);
        report
    }

    /// Runs forever, handing every poll report and the tick its poll started
    /// at to `observer`.
    pub fn run_with<F>(&mut self, mut observer: F) -> !
    where
        F: FnMut(&PollReport, Ticks),
    {
        loop {
            let started_at = self.clock.now();
            let report = self.step();
            observer(&report, started_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SimulatedLines;
    use crate::sequencer::{LOOP_CADENCE_TICKS, PowerState, SETTLE_TICKS};
    use crate::timebase::LogicalClock;

    fn controller() -> Controller<SimulatedLines, LogicalClock, 32> {
        Controller::new(SimulatedLines::new(), LogicalClock::new())
    }

    #[test]
    fn idle_iteration_waits_the_loop_cadence() {
        let mut controller = controller();
        controller.step();
        assert_eq!(controller.now(), Ticks::new(u32::from(LOOP_CADENCE_TICKS)));
        assert_eq!(controller.clock().last_wait(), Some(LOOP_CADENCE_TICKS));
        assert_eq!(controller.iterations(), 1);
        assert!(controller.telemetry().is_empty());
    }

    #[test]
    fn power_on_iteration_includes_settle_then_cadence() {
        let mut controller = controller();
        controller.io_mut().press_button();

        let report = controller.step();

        assert_eq!(report.to(), PowerState::PoweredOn);
        assert_eq!(
            controller.now(),
            Ticks::new(u32::from(SETTLE_TICKS) + u32::from(LOOP_CADENCE_TICKS))
        );
        assert_eq!(controller.clock().waits_started(), 2);
        assert_eq!(controller.telemetry().len(), 4);
    }
}
