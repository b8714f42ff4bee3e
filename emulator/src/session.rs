use std::fmt::{self, Write as _};
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant as HostInstant};

use controller_core::driver::Controller;
use controller_core::io::SimulatedLines;
use controller_core::repl::grammar::{self, ConsoleCommand, ParseError};
use controller_core::repl::status::{StatusFormatter, StatusSnapshot};
use controller_core::sequencer::PollReport;
use controller_core::timebase::{LogicalClock, Ticks};

/// Largest `step` or `advance` count accepted in one command.
pub const MAX_ITERATIONS_PER_COMMAND: u32 = 100_000;

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("press", "press                - hold the power button down"),
    ("release", "release              - let go of the power button"),
    ("host", "host <up|down>       - drive the host heartbeat line"),
    ("step", "step [n]             - run n controller iterations (default 1)"),
    ("advance", "advance <ticks>      - let time pass without polling"),
    ("status", "status               - show state, inputs and outputs"),
    ("log", "log [n]              - show the newest telemetry records"),
    ("help", "help                 - show this list"),
];

/// Errors reported back to the console as `ERR` lines.
#[derive(Debug, Eq, PartialEq)]
pub enum SessionError {
    Parse(ParseError),
    TooManyIterations { requested: u32 },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Parse(err) => write!(f, "syntax {err}"),
            SessionError::TooManyIterations { requested } => write!(
                f,
                "limit {requested} exceeds {MAX_ITERATIONS_PER_COMMAND} per command"
            ),
        }
    }
}

impl From<ParseError> for SessionError {
    fn from(err: ParseError) -> Self {
        SessionError::Parse(err)
    }
}

pub struct Session {
    controller: Controller<SimulatedLines, LogicalClock>,
    transcript: Option<TranscriptLogger>,
    started_at: HostInstant,
}

impl Session {
    /// Starts a session in standby, optionally mirroring it to a transcript file.
    pub fn new(transcript: Option<&Path>) -> io::Result<Self> {
        let transcript = transcript.map(TranscriptLogger::create).transpose()?;
        Ok(Self {
            controller: Controller::new(SimulatedLines::new(), LogicalClock::new()),
            transcript,
            started_at: HostInstant::now(),
        })
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let elapsed = self.started_at.elapsed();
        if let Some(transcript) = self.transcript.as_mut() {
            transcript.append_line(elapsed, TranscriptRole::Host, trimmed)?;
        }

        let lines = match self.execute(trimmed) {
            Ok(lines) => lines,
            Err(err) => vec![format!("ERR {err}")],
        };

        if let Some(transcript) = self.transcript.as_mut() {
            for response in &lines {
                transcript.append_line(elapsed, TranscriptRole::Emulator, response)?;
            }
        }
        Ok(lines)
    }

    fn execute(&mut self, line: &str) -> Result<Vec<String>, SessionError> {
        let lines = match grammar::parse(line)? {
            ConsoleCommand::Press => {
                self.controller.io_mut().press_button();
                vec!["ok button pressed".to_string()]
            }
            ConsoleCommand::Release => {
                self.controller.io_mut().release_button();
                vec!["ok button released".to_string()]
            }
            ConsoleCommand::Host(alive) => {
                self.controller.io_mut().set_host_alive(alive);
                let label = if alive { "up" } else { "down" };
                vec![format!("ok host {label}")]
            }
            ConsoleCommand::Step(count) => self.step(check_limit(count)?),
            ConsoleCommand::Advance(ticks) => {
                self.controller.clock_mut().advance(check_limit(ticks)?);
                vec![format!("ok now {}", self.controller.now())]
            }
            ConsoleCommand::Status => self.status(),
            ConsoleCommand::Log(count) => self.log(count),
            ConsoleCommand::Help => HELP_TOPICS
                .iter()
                .map(|(_, usage)| (*usage).to_string())
                .collect(),
        };
        Ok(lines)
    }

    fn step(&mut self, count: u32) -> Vec<String> {
        let mut lines = Vec::new();
        for _ in 0..count {
            let started_at = self.controller.now();
            let report = self.controller.step();
            if report.changed_state() {
                lines.push(describe_transition(&report, started_at));
            }
        }
        lines.push(format!(
            "ok {count} step(s), now {} in {}",
            self.controller.now(),
            self.controller.sequencer().state()
        ));
        lines
    }

    fn status(&self) -> Vec<String> {
        let snapshot = StatusSnapshot::new(
            self.controller.sequencer().state(),
            self.controller.now(),
            self.controller.io().levels(),
        );
        let formatter = StatusFormatter::new(&snapshot);

        let mut state = String::new();
        let mut inputs = String::new();
        let mut outputs = String::new();
        // Writing into a String cannot fail.
        let _ = formatter.write_state_line(&mut state);
        let _ = formatter.write_inputs_line(&mut inputs);
        let _ = formatter.write_outputs_line(&mut outputs);
        vec![state, inputs, outputs]
    }

    fn log(&self, count: u32) -> Vec<String> {
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        let lines: Vec<String> = self
            .controller
            .telemetry()
            .recent(count)
            .map(ToString::to_string)
            .collect();
        if lines.is_empty() {
            vec!["no telemetry recorded".to_string()]
        } else {
            lines
        }
    }
}

fn check_limit(requested: u32) -> Result<u32, SessionError> {
    if requested > MAX_ITERATIONS_PER_COMMAND {
        Err(SessionError::TooManyIterations { requested })
    } else {
        Ok(requested)
    }
}

fn describe_transition(report: &PollReport, started_at: Ticks) -> String {
    let mut line = format!("{started_at} {} -> {}", report.from, report.to());
    if let Some(periods) = report.decision.wait {
        let _ = write!(line, " (hold {periods}t)");
    }
    line
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header()?;
        Ok(logger)
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.writer, "# Host power controller emulator transcript")?;
        writeln!(
            self.writer,
            "# Timestamps are milliseconds since session start"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(
        &mut self,
        elapsed: Duration,
        role: TranscriptRole,
        line: &str,
    ) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            elapsed.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => ">",
            TranscriptRole::Emulator => "<",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(None).expect("session without transcript")
    }

    fn run(session: &mut Session, line: &str) -> Vec<String> {
        session.handle_command(line).expect("in-memory command")
    }

    #[test]
    fn press_and_step_powers_the_host() {
        let mut session = session();
        assert_eq!(run(&mut session, "press"), vec!["ok button pressed"]);

        let lines = run(&mut session, "step");
        assert_eq!(lines[0], "0t standby -> powered-on (hold 150t)");
        assert_eq!(lines[1], "ok 1 step(s), now 152t in powered-on");
    }

    #[test]
    fn status_reports_all_lines() {
        let mut session = session();
        run(&mut session, "press");
        run(&mut session, "step");

        let lines = run(&mut session, "status");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "state powered-on uptime=+4.3s (152t)");
        assert_eq!(lines[1], "inputs BUTTON*=asserted HOST_STATUS=released");
        assert!(lines[2].contains("POWER*=asserted(low)"));
    }

    #[test]
    fn full_cycle_through_the_console() {
        let mut session = session();
        for command in ["press", "step", "release", "host up", "step 3", "press", "step"] {
            run(&mut session, command);
        }
        let lines = run(&mut session, "release");
        assert_eq!(lines, vec!["ok button released"]);
        run(&mut session, "host down");

        let lines = run(&mut session, "step");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("shutting-down -> standby"));
        assert!(lines[1].ends_with("in standby"));
    }

    #[test]
    fn syntax_errors_become_err_lines() {
        let mut session = session();
        let lines = run(&mut session, "reboot now");
        assert_eq!(lines, vec!["ERR syntax unexpected input at column 0"]);
    }

    #[test]
    fn oversized_step_is_rejected() {
        let mut session = session();
        let lines = run(&mut session, "step 100001");
        assert_eq!(
            lines,
            vec!["ERR limit 100001 exceeds 100000 per command".to_string()]
        );
    }

    #[test]
    fn log_shows_recent_telemetry() {
        let mut session = session();
        assert_eq!(run(&mut session, "log"), vec!["no telemetry recorded"]);

        run(&mut session, "press");
        run(&mut session, "step");
        let lines = run(&mut session, "log 1");
        assert_eq!(lines, vec!["#3 @0t wait-started periods=150"]);
    }

    #[test]
    fn advance_moves_time_without_polling() {
        let mut session = session();
        run(&mut session, "press");
        assert_eq!(run(&mut session, "advance 35"), vec!["ok now 35t"]);
        assert!(run(&mut session, "status")[0].starts_with("state standby"));
    }
}
