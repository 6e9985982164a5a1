//! Line-oriented read loop over a [`Console`].

use crate::commands::{split_word, Action, Session};
use std::io::{self, BufRead, Write};

pub const PROMPT: &str = "> ";
const QUIT: &str = "q";

pub trait Console {
    /// Reads one line without its terminator; `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn write_line(&mut self, line: &str);
}

pub struct StdConsole {
    stdin: io::StdinLock<'static>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin().lock(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if self.stdin.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(Some(line))
    }

    fn write_line(&mut self, line: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            tracing::warn!(error = %e, "failed to write to stdout");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Handles one input line. Blank lines and unknown command names are
/// ignored without any message.
pub async fn handle_line(session: &mut Session, line: &str, console: &mut dyn Console) -> Flow {
    if line.trim().is_empty() {
        return Flow::Continue;
    }
    if line.trim() == QUIT {
        return Flow::Quit;
    }

    let (name, args) = split_word(line);
    match session.commands().lookup(name) {
        Some(command) => session.execute(command.action, args, console).await,
        None => tracing::debug!(name, "ignoring unknown command"),
    }
    Flow::Continue
}

/// Shows the timeline once, then reads and runs commands until `q` or end
/// of input.
pub async fn run(session: &mut Session, console: &mut dyn Console) -> io::Result<()> {
    session.execute(Action::Show, "", console).await;

    while let Some(line) = console.read_line(PROMPT)? {
        if handle_line(session, &line, console).await == Flow::Quit {
            break;
        }
    }
    Ok(())
}
