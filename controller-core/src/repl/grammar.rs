//! Parser for the controller console.
//!
//! Commands are short single-line keywords with at most one numeric argument,
//! so the grammar is a flat `winnow` alternation over the trimmed line. The
//! parser never allocates and is usable from `no_std` front-ends.

use core::fmt;

use winnow::ascii::{dec_uint, space1};
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

/// Number of telemetry records shown by a bare `log`.
pub const DEFAULT_LOG_RECORDS: u32 = 10;

type PResult<O> = Result<O, ErrMode<ContextError>>;

/// Parsed console command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConsoleCommand {
    /// Hold the user button down.
    Press,
    /// Let go of the user button.
    Release,
    /// Drive the host heartbeat (`host up` / `host down`).
    Host(bool),
    /// Run this many driver loop iterations.
    Step(u32),
    /// Deliver tick events without polling.
    Advance(u32),
    Status,
    /// Show the newest telemetry records.
    Log(u32),
    Help,
}

/// Errors returned by [`parse`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// Line held only whitespace.
    Empty,
    /// Input stopped matching the grammar at this byte offset.
    Syntax { offset: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty command"),
            ParseError::Syntax { offset } => write!(f, "unexpected input at column {offset}"),
        }
    }
}

/// Parses one console line.
pub fn parse(line: &str) -> Result<ConsoleCommand, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let leading = line.len() - line.trim_start().len();
    command.parse(trimmed).map_err(|err| ParseError::Syntax {
        offset: leading + err.offset(),
    })
}

fn command(input: &mut &str) -> PResult<ConsoleCommand> {
    alt((
        "press".value(ConsoleCommand::Press),
        "release".value(ConsoleCommand::Release),
        host,
        step,
        "status".value(ConsoleCommand::Status),
        advance,
        log,
        "help".value(ConsoleCommand::Help),
    ))
    .parse_next(input)
}

fn host(input: &mut &str) -> PResult<ConsoleCommand> {
    preceded(
        ("host", space1),
        alt(("up".value(true), "down".value(false))),
    )
    .map(ConsoleCommand::Host)
    .parse_next(input)
}

fn step(input: &mut &str) -> PResult<ConsoleCommand> {
    preceded("step", opt(preceded(space1, dec_uint::<_, u32, _>)))
        .map(|count| ConsoleCommand::Step(count.unwrap_or(1)))
        .parse_next(input)
}

fn advance(input: &mut &str) -> PResult<ConsoleCommand> {
    preceded(("advance", space1), dec_uint::<_, u32, _>)
        .map(ConsoleCommand::Advance)
        .parse_next(input)
}

fn log(input: &mut &str) -> PResult<ConsoleCommand> {
    preceded("log", opt(preceded(space1, dec_uint::<_, u32, _>)))
        .map(|count| ConsoleCommand::Log(count.unwrap_or(DEFAULT_LOG_RECORDS)))
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_keywords() {
        assert_eq!(parse("press"), Ok(ConsoleCommand::Press));
        assert_eq!(parse("release"), Ok(ConsoleCommand::Release));
        assert_eq!(parse("status"), Ok(ConsoleCommand::Status));
        assert_eq!(parse("help"), Ok(ConsoleCommand::Help));
    }

    #[test]
    fn host_takes_up_or_down() {
        assert_eq!(parse("host up"), Ok(ConsoleCommand::Host(true)));
        assert_eq!(parse("host   down"), Ok(ConsoleCommand::Host(false)));
        assert!(matches!(parse("host"), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse("host sideways"), Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn step_and_log_default_their_counts() {
        assert_eq!(parse("step"), Ok(ConsoleCommand::Step(1)));
        assert_eq!(parse("step 40"), Ok(ConsoleCommand::Step(40)));
        assert_eq!(parse("log"), Ok(ConsoleCommand::Log(DEFAULT_LOG_RECORDS)));
        assert_eq!(parse("log 3"), Ok(ConsoleCommand::Log(3)));
    }

    #[test]
    fn advance_requires_a_tick_count() {
        assert_eq!(parse("advance 150"), Ok(ConsoleCommand::Advance(150)));
        assert!(matches!(parse("advance"), Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse("  press \t"), Ok(ConsoleCommand::Press));
        assert_eq!(parse("   "), Err(ParseError::Empty));
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(matches!(parse("pressed"), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse("step x"), Err(ParseError::Syntax { .. })));
        assert!(matches!(parse("reboot"), Err(ParseError::Syntax { .. })));
    }
}
