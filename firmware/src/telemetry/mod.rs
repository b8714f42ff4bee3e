//! Log sink for sequencer activity.
//!
//! Firmware builds emit through `defmt`; host builds print the same lines so
//! the module stays testable off-target.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use controller_core::lines::ALL_LINES;
use controller_core::sequencer::{PollReport, PowerState};
use controller_core::timebase::{TICKS_PER_SECOND, Ticks};

/// Fields logged for one state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionLog {
    pub from: &'static str,
    pub to: &'static str,
    pub at_ticks: u32,
    pub button: bool,
    pub host_alive: bool,
}

impl TransitionLog {
    /// Returns `None` for polls that stayed in the same state.
    pub fn from_report(report: &PollReport, at: Ticks) -> Option<Self> {
        if !report.changed_state() {
            return None;
        }
        Some(Self {
            from: report.from.label(),
            to: report.to().label(),
            at_ticks: at.get(),
            button: report.inputs.button_pressed,
            host_alive: report.inputs.host_alive,
        })
    }
}

/// Logs the poll if it changed state. `at` is the tick the poll started.
pub fn record_poll(report: &PollReport, at: Ticks) {
    if let Some(entry) = TransitionLog::from_report(report, at) {
        emit_transition(&entry);
        if report.to() == PowerState::ShuttingDown {
            emit_shutdown_requested(entry.at_ticks);
        }
    }
}

pub fn record_boot() {
    emit_boot(TICKS_PER_SECOND);
    for line in &ALL_LINES {
        emit_line(line.name, line.mcu_pin);
    }
}

#[cfg(target_os = "none")]
fn emit_transition(entry: &TransitionLog) {
    defmt::info!(
        "sequencer {} -> {} t={}t button={} host={}",
        entry.from,
        entry.to,
        entry.at_ticks,
        entry.button,
        entry.host_alive
    );
}

#[cfg(not(target_os = "none"))]
fn emit_transition(entry: &TransitionLog) {
    println!(
        "sequencer {} -> {} t={}t button={} host={}",
        entry.from, entry.to, entry.at_ticks, entry.button, entry.host_alive
    );
}

#[cfg(target_os = "none")]
fn emit_shutdown_requested(at_ticks: u32) {
    defmt::warn!("host shutdown requested t={}t", at_ticks);
}

#[cfg(not(target_os = "none"))]
fn emit_shutdown_requested(at_ticks: u32) {
    println!("host shutdown requested t={at_ticks}t");
}

#[cfg(target_os = "none")]
fn emit_boot(tick_hz: u8) {
    defmt::info!("host power controller up, time base {} Hz", tick_hz);
}

#[cfg(not(target_os = "none"))]
fn emit_boot(tick_hz: u8) {
    println!("host power controller up, time base {tick_hz} Hz");
}

#[cfg(target_os = "none")]
fn emit_line(name: &'static str, pin: &'static str) {
    defmt::info!("line {} on {}", name, pin);
}

#[cfg(not(target_os = "none"))]
fn emit_line(name: &'static str, pin: &'static str) {
    println!("line {name} on {pin}");
}
