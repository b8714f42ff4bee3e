//! Power sequencing state machine.
//!
//! [`decide`] is the whole transition table as a pure function of the current
//! [`PowerState`] and the two sampled inputs. [`PowerSequencer::poll`] samples
//! the inputs through a [`ControllerIo`], drives the resulting outputs, commits
//! the next state and then performs any blocking wait the transition asks for.
//! While that wait runs nothing is sampled, which is what locks out the
//! power-on press and throttles the shutdown blink.

use core::fmt;

use heapless::Vec;

use crate::io::{ControllerIo, LedCommand, OutputAction};
use crate::timebase::Clock;

pub mod timing;

pub use timing::{LOOP_CADENCE_TICKS, SETTLE_TICKS, SHUTDOWN_RECHECK_TICKS, SequencerTiming};

/// Upper bound on output changes a single poll can emit.
pub const MAX_ACTIONS: usize = 4;

/// Ordered output changes produced by one decision.
pub type ActionList = Vec<OutputAction, MAX_ACTIONS>;

/// Power sequencing phase.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PowerState {
    /// Host unpowered, waiting for a button press.
    #[default]
    Standby,
    /// Host powered; booting or running.
    PoweredOn,
    /// Shutdown requested; waiting for the heartbeat to drop.
    ShuttingDown,
}

impl PowerState {
    pub const ALL: [PowerState; 3] = [
        PowerState::Standby,
        PowerState::PoweredOn,
        PowerState::ShuttingDown,
    ];

    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            PowerState::Standby => 0,
            PowerState::PoweredOn => 1,
            PowerState::ShuttingDown => 2,
        }
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PowerState::Standby),
            1 => Some(PowerState::PoweredOn),
            2 => Some(PowerState::ShuttingDown),
            _ => None,
        }
    }

    /// Short lowercase name used in logs and on the console.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PowerState::Standby => "standby",
            PowerState::PoweredOn => "powered-on",
            PowerState::ShuttingDown => "shutting-down",
        }
    }

    /// Returns `true` when the power switch should be applying power.
    #[must_use]
    pub const fn is_powered(self) -> bool {
        matches!(self, PowerState::PoweredOn | PowerState::ShuttingDown)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs sampled at the start of a poll.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Inputs {
    pub button_pressed: bool,
    pub host_alive: bool,
}

impl Inputs {
    #[must_use]
    pub const fn new(button_pressed: bool, host_alive: bool) -> Self {
        Self {
            button_pressed,
            host_alive,
        }
    }

    /// Reads both inputs from the board.
    pub fn sample<I: ControllerIo + ?Sized>(io: &mut I) -> Self {
        Self::new(io.button_pressed(), io.host_alive())
    }
}

/// Outcome of evaluating the transition table once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Decision {
    pub next: PowerState,
    pub actions: ActionList,
    /// Blocking wait performed after the outputs are driven.
    pub wait: Option<u16>,
}

impl Decision {
    /// No state change, no outputs, no wait.
    #[must_use]
    pub const fn hold(state: PowerState) -> Self {
        Self {
            next: state,
            actions: Vec::new(),
            wait: None,
        }
    }

    fn to<const N: usize>(
        next: PowerState,
        actions: [OutputAction; N],
        wait: Option<u16>,
    ) -> Self {
        const { assert!(N <= MAX_ACTIONS) };
        let mut list = ActionList::new();
        list.extend(actions);
        Self {
            next,
            actions: list,
            wait,
        }
    }
}

/// Evaluates the transition table. Total over every state and input pair.
#[must_use]
pub fn decide(state: PowerState, inputs: Inputs, timing: &SequencerTiming) -> Decision {
    match state {
        PowerState::Standby if inputs.button_pressed => Decision::to(
            PowerState::PoweredOn,
            [OutputAction::Power(true), OutputAction::Led(LedCommand::On)],
            Some(timing.settle_ticks),
        ),
        PowerState::Standby => Decision::hold(state),
        // The button is only considered once the host reports it is alive.
        PowerState::PoweredOn if inputs.host_alive && inputs.button_pressed => Decision::to(
            PowerState::ShuttingDown,
            [OutputAction::ShutdownRequest(true)],
            None,
        ),
        PowerState::PoweredOn => Decision::hold(state),
        PowerState::ShuttingDown if inputs.host_alive => Decision::to(
            PowerState::ShuttingDown,
            [OutputAction::Led(LedCommand::Toggle)],
            Some(timing.shutdown_recheck_ticks),
        ),
        PowerState::ShuttingDown => Decision::to(
            PowerState::Standby,
            [
                OutputAction::Led(LedCommand::Toggle),
                OutputAction::Power(false),
                OutputAction::Led(LedCommand::Off),
                OutputAction::ShutdownRequest(false),
            ],
            None,
        ),
    }
}

/// Last logical level driven onto each output.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct OutputLevels {
    pub power: bool,
    pub led: bool,
    pub shutdown_request: bool,
}

impl OutputLevels {
    /// Output set at reset and in [`PowerState::Standby`].
    pub const OFF: Self = Self {
        power: false,
        led: false,
        shutdown_request: false,
    };

    /// Folds a single action into the tracked levels.
    pub fn apply(&mut self, action: OutputAction) {
        match action {
            OutputAction::Power(on) => self.power = on,
            OutputAction::Led(command) => self.led = command.apply(self.led),
            OutputAction::ShutdownRequest(requested) => self.shutdown_request = requested,
        }
    }
}

/// Record of a single [`PowerSequencer::poll`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PollReport {
    pub from: PowerState,
    pub inputs: Inputs,
    pub decision: Decision,
}

impl PollReport {
    /// State after the poll.
    #[must_use]
    pub const fn to(&self) -> PowerState {
        self.decision.next
    }

    /// Returns `true` when the poll moved to a different state.
    #[must_use]
    pub fn changed_state(&self) -> bool {
        self.from != self.decision.next
    }
}

/// Owns the power state and the outputs it implies.
#[derive(Clone, Debug)]
pub struct PowerSequencer {
    state: PowerState,
    outputs: OutputLevels,
    timing: SequencerTiming,
}

impl PowerSequencer {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_timing(SequencerTiming::DEFAULT)
    }

    #[must_use]
    pub const fn with_timing(timing: SequencerTiming) -> Self {
        Self {
            state: PowerState::Standby,
            outputs: OutputLevels::OFF,
            timing,
        }
    }

    #[must_use]
    pub const fn state(&self) -> PowerState {
        self.state
    }

    #[must_use]
    pub const fn outputs(&self) -> OutputLevels {
        self.outputs
    }

    #[must_use]
    pub const fn timing(&self) -> &SequencerTiming {
        &self.timing
    }

    /// Samples inputs, drives outputs, advances the state and blocks for any
    /// wait the transition requires.
    pub fn poll<I, C>(&mut self, io: &mut I, clock: &mut C) -> PollReport
    where
        I: ControllerIo + ?Sized,
        C: Clock + ?Sized,
    {
        let inputs = Inputs::sample(io);
        let decision = decide(self.state, inputs, &self.timing);

        for action in &decision.actions {
            action.apply(io);
            self.outputs.apply(*action);
        }

        let from = self.state;
        self.state = decision.next;

        if let Some(periods) = decision.wait {
            clock.wait(periods);
        }

        PollReport {
            from,
            inputs,
            decision,
        }
    }
}

impl Default for PowerSequencer {
    fn default() -> Self {
        Self::new()
    }
}
