//! Telemetry event catalog and the fixed-capacity ring that stores it.
//!
//! Every poll of the sequencer can be folded into the ring: state entries,
//! line drives, LED toggles and blocking waits, each stamped with the tick at
//! which the poll started. Event kinds encode to compact numeric codes so the
//! firmware can emit them over a debug channel without formatting strings.

use core::fmt;

use heapless::HistoryBuf;

use crate::io::{LedCommand, OutputAction};
use crate::lines::LineId;
use crate::sequencer::{Inputs, PollReport, PowerState};
use crate::timebase::Ticks;

/// Identifier used when tracking emitted telemetry events.
pub type EventId = u32;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 64;

/// Discriminated telemetry events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryEventKind {
    StateEntered(PowerState),
    LineAsserted(LineId),
    LineReleased(LineId),
    LedToggled,
    WaitStarted,
    Custom(u16),
}

impl fmt::Display for TelemetryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEventKind::StateEntered(state) => write!(f, "state-entered {state}"),
            TelemetryEventKind::LineAsserted(line) => write!(f, "line-asserted {line}"),
            TelemetryEventKind::LineReleased(line) => write!(f, "line-released {line}"),
            TelemetryEventKind::LedToggled => f.write_str("led-toggled"),
            TelemetryEventKind::WaitStarted => f.write_str("wait-started"),
            TelemetryEventKind::Custom(code) => write!(f, "custom({code})"),
        }
    }
}

impl TelemetryEventKind {
    const STATE_ENTERED_BASE: u16 = 0x0000;
    const LINE_ASSERTED_BASE: u16 = 0x0010;
    const LINE_RELEASED_BASE: u16 = 0x0018;
    const LED_TOGGLED_CODE: u16 = 0x0020;
    const WAIT_STARTED_CODE: u16 = 0x0021;

    /// Encodes the event into a compact transport-friendly discriminant.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            TelemetryEventKind::StateEntered(state) => {
                Self::STATE_ENTERED_BASE + state.as_index() as u16
            }
            TelemetryEventKind::LineAsserted(line) => {
                Self::LINE_ASSERTED_BASE + line.as_index() as u16
            }
            TelemetryEventKind::LineReleased(line) => {
                Self::LINE_RELEASED_BASE + line.as_index() as u16
            }
            TelemetryEventKind::LedToggled => Self::LED_TOGGLED_CODE,
            TelemetryEventKind::WaitStarted => Self::WAIT_STARTED_CODE,
            TelemetryEventKind::Custom(code) => code,
        }
    }

    /// Decodes a raw discriminant, falling back to [`TelemetryEventKind::Custom`].
    #[must_use]
    pub fn from_raw(code: u16) -> Self {
        match code {
            Self::LED_TOGGLED_CODE => TelemetryEventKind::LedToggled,
            Self::WAIT_STARTED_CODE => TelemetryEventKind::WaitStarted,
            value if (Self::STATE_ENTERED_BASE..Self::LINE_ASSERTED_BASE).contains(&value) => {
                PowerState::from_index(usize::from(value - Self::STATE_ENTERED_BASE))
                    .map_or(TelemetryEventKind::Custom(value), TelemetryEventKind::StateEntered)
            }
            value if (Self::LINE_ASSERTED_BASE..Self::LINE_RELEASED_BASE).contains(&value) => {
                LineId::from_index(usize::from(value - Self::LINE_ASSERTED_BASE))
                    .map_or(TelemetryEventKind::Custom(value), TelemetryEventKind::LineAsserted)
            }
            value if (Self::LINE_RELEASED_BASE..Self::LED_TOGGLED_CODE).contains(&value) => {
                LineId::from_index(usize::from(value - Self::LINE_RELEASED_BASE))
                    .map_or(TelemetryEventKind::Custom(value), TelemetryEventKind::LineReleased)
            }
            other => TelemetryEventKind::Custom(other),
        }
    }
}

/// Payloads carried alongside telemetry events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TelemetryPayload {
    None,
    Transition(TransitionTelemetry),
    Wait(WaitTelemetry),
}

/// Details captured when the sequencer changes state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransitionTelemetry {
    pub from: PowerState,
    pub inputs: Inputs,
    /// Time spent in `from`, when a previous transition is known.
    pub dwell: Option<Ticks>,
}

/// Details captured when a blocking wait starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WaitTelemetry {
    pub periods: u16,
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TelemetryRecord {
    pub id: EventId,
    pub timestamp: Ticks,
    pub event: TelemetryEventKind,
    pub details: TelemetryPayload,
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} @{} {}", self.id, self.timestamp, self.event)?;
        match self.details {
            TelemetryPayload::None => Ok(()),
            TelemetryPayload::Transition(transition) => {
                write!(f, " from={}", transition.from)?;
                if let Some(dwell) = transition.dwell {
                    write!(f, " dwell={dwell}")?;
                }
                Ok(())
            }
            TelemetryPayload::Wait(wait) => write!(f, " periods={}", wait.periods),
        }
    }
}

/// Records telemetry events into a fixed-size ring buffer.
pub struct TelemetryRecorder<const CAPACITY: usize = TELEMETRY_RING_CAPACITY> {
    ring: HistoryBuf<TelemetryRecord, CAPACITY>,
    last_transition_at: Option<Ticks>,
    next_event_id: EventId,
}

impl<const CAPACITY: usize> TelemetryRecorder<CAPACITY> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            last_transition_at: None,
            next_event_id: 0,
        }
    }

    /// Records in chronological order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &TelemetryRecord> + '_ {
        self.ring.oldest_ordered()
    }

    /// The newest `count` records, oldest of those first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &TelemetryRecord> + '_ {
        let skip = self.ring.len().saturating_sub(count);
        self.ring.oldest_ordered().skip(skip)
    }

    /// Returns the most recent telemetry record, if available.
    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no telemetry records are stored.
    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    /// Records an arbitrary telemetry event with the supplied payload.
    pub fn record(
        &mut self,
        event: TelemetryEventKind,
        details: TelemetryPayload,
        timestamp: Ticks,
    ) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);
        self.ring.write(TelemetryRecord {
            id,
            timestamp,
            event,
            details,
        });
        id
    }

    /// Records entry into `to`, including the dwell time in the previous state.
    pub fn record_transition(
        &mut self,
        from: PowerState,
        to: PowerState,
        inputs: Inputs,
        timestamp: Ticks,
    ) -> EventId {
        let dwell = self
            .last_transition_at
            .map(|previous| timestamp.saturating_since(previous));
        self.last_transition_at = Some(timestamp);

        self.record(
            TelemetryEventKind::StateEntered(to),
            TelemetryPayload::Transition(TransitionTelemetry {
                from,
                inputs,
                dwell,
            }),
            timestamp,
        )
    }

    /// Records a single output change.
    pub fn record_action(&mut self, action: OutputAction, timestamp: Ticks) -> EventId {
        let event = match action {
            OutputAction::Led(LedCommand::Toggle) => TelemetryEventKind::LedToggled,
            OutputAction::Led(LedCommand::On)
            | OutputAction::Power(true)
            | OutputAction::ShutdownRequest(true) => TelemetryEventKind::LineAsserted(action.line()),
            OutputAction::Led(LedCommand::Off)
            | OutputAction::Power(false)
            | OutputAction::ShutdownRequest(false) => {
                TelemetryEventKind::LineReleased(action.line())
            }
        };
        self.record(event, TelemetryPayload::None, timestamp)
    }

    /// Records the start of a blocking wait.
    pub fn record_wait(&mut self, periods: u16, timestamp: Ticks) -> EventId {
        self.record(
            TelemetryEventKind::WaitStarted,
            TelemetryPayload::Wait(WaitTelemetry { periods }),
            timestamp,
        )
    }

    /// Folds a whole poll into the ring and returns the number of records added.
    pub fn record_poll(&mut self, report: &PollReport, started_at: Ticks) -> usize {
        let mut added = 0;
        for action in &report.decision.actions {
            self.record_action(*action, started_at);
            added += 1;
        }
        if report.changed_state() {
            self.record_transition(report.from, report.to(), report.inputs, started_at);
            added += 1;
        }
        if let Some(periods) = report.decision.wait {
            self.record_wait(periods, started_at);
            added += 1;
        }
        added
    }
}

impl<const CAPACITY: usize> Default for TelemetryRecorder<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
