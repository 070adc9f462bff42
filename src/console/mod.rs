//! Operator console: line prompts on stdin/stdout
//!
//! Generic over the reader and writer so menus and the session loop can be
//! driven from in-memory buffers in tests.

pub mod menu;

pub use menu::resolve_session;

use crate::error::{LoopbackError, Result};
use colored::Colorize;
use std::fmt::Display;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<StdinLock<'static>, Stdout> {
    /// Console on the process's standard streams
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print one line
    pub fn say(&mut self, message: impl Display) -> Result<()> {
        writeln!(self.output, "{}", message).map_err(LoopbackError::Console)
    }

    /// Print without a line break and flush, so the text shows up before a
    /// blocking call
    pub fn print(&mut self, message: impl Display) -> Result<()> {
        write!(self.output, "{}", message).map_err(LoopbackError::Console)?;
        self.output.flush().map_err(LoopbackError::Console)
    }

    /// Print a line, then read the answer. `None` means input is closed.
    pub fn ask(&mut self, question: impl Display) -> Result<Option<String>> {
        self.say(question)?;
        self.output.flush().map_err(LoopbackError::Console)?;
        self.read_line()
    }

    /// Like [`Console::ask`], but closed input is an error
    pub fn prompt(&mut self, question: impl Display) -> Result<String> {
        self.ask(question)?.ok_or(LoopbackError::InputClosed)
    }

    /// Read one line without its line terminator
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .map_err(LoopbackError::Console)?;
        if n == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// Print the program banner
pub fn print_banner<R: BufRead, W: Write>(console: &mut Console<R, W>, mode: &str) -> Result<()> {
    console.say("=".repeat(60))?;
    console.say(format!("{}", "UART Loopback".cyan().bold()))?;
    console.say(format!("  16-byte frame {}", mode))?;
    console.say("=".repeat(60))
}

#[cfg(test)]
pub(crate) fn scripted(input: &str) -> Console<io::Cursor<Vec<u8>>, Vec<u8>> {
    Console::new(io::Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

#[cfg(test)]
pub(crate) fn captured<R>(console: &Console<R, Vec<u8>>) -> String {
    String::from_utf8_lossy(&console.output).into_owned()
}
