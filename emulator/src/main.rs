mod session;

use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use session::Session;

fn main() -> io::Result<()> {
    let transcript = parse_transcript_path().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: controller-emulator [--transcript <path>]");
        process::exit(2);
    });

    let mut session = Session::new(transcript.as_deref())?;
    let stdin = io::stdin();
    // Prompt only on a terminal.
    let interactive = stdin.is_terminal();
    let mut out = io::stdout().lock();

    prompt(&mut out, interactive)?;
    for line in stdin.lock().lines() {
        match line?.trim() {
            "exit" | "quit" => break,
            command => {
                for response in session.handle_command(command)? {
                    writeln!(out, "{response}")?;
                }
            }
        }
        prompt(&mut out, interactive)?;
    }
    Ok(())
}

fn prompt(out: &mut impl Write, interactive: bool) -> io::Result<()> {
    if interactive {
        write!(out, "power> ")?;
        out.flush()?;
    }
    Ok(())
}

fn parse_transcript_path() -> Result<Option<PathBuf>, String> {
    let mut args = env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(None);
    };

    let path = if let Some(value) = arg.strip_prefix("--transcript=") {
        value.to_string()
    } else if arg == "--transcript" {
        args.next()
            .ok_or_else(|| "Expected value after --transcript".to_string())?
    } else {
        return Err(format!("Unknown argument `{arg}`"));
    };

    if path.is_empty() {
        return Err("Transcript path must not be empty".to_string());
    }
    if let Some(extra) = args.next() {
        return Err(format!("Unexpected argument `{extra}`"));
    }
    Ok(Some(PathBuf::from(path)))
}
