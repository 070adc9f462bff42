//! Port and baud rate selection menus
//!
//! Bad answers are reported and asked again; nothing here gives up on the
//! operator except closed input.

use crate::config::{AppConfig, SessionConfig};
use crate::console::Console;
use crate::error::Result;
use crate::serial::PortSource;
use colored::Colorize;
use std::io::{BufRead, Write};

const NO_PORTS_PROMPT: &str =
    "No serial port available. Make sure to connect to device then press enter to try again";

/// Pick a port, waiting for one to appear if none is available.
///
/// A single available port is used without showing the menu.
pub fn choose_port<S, R, W>(source: &mut S, console: &mut Console<R, W>) -> Result<String>
where
    S: PortSource + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut ports = source.list_ports()?;
    while ports.is_empty() {
        console.prompt(NO_PORTS_PROMPT.yellow())?;
        ports = source.list_ports()?;
    }

    if let [only] = ports.as_slice() {
        console.say(format!(
            "{} Using only available port \"{}\"",
            "[OK]".green().bold(),
            only
        ))?;
        return Ok(only.clone());
    }

    select_from_menu(&ports, console)
}

fn select_from_menu<R: BufRead, W: Write>(
    ports: &[String],
    console: &mut Console<R, W>,
) -> Result<String> {
    loop {
        console.say("Choose a serial port:")?;
        for (i, port) in ports.iter().enumerate() {
            console.say(format!("    ({}) {}", i, port))?;
        }

        let answer = console.prompt("")?;
        match answer.trim().parse::<i64>() {
            Err(_) => console.say("Wrong response type, try again !".red())?,
            Ok(index) => match usize::try_from(index).ok().and_then(|i| ports.get(i)) {
                Some(port) => return Ok(port.clone()),
                None => console.say(format!("{} is out of range, try again !", index).red())?,
            },
        }
    }
}

/// Ask for a baud rate. With a fallback, an empty answer selects it.
///
/// Any integer is accepted; the serial driver rejects rates it cannot use.
pub fn choose_baud_rate<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    fallback: Option<u32>,
) -> Result<u32> {
    let question = match fallback {
        Some(rate) => format!("Choose a baudrate (leave empty for {} by default):", rate),
        None => "Choose a baudrate:".to_string(),
    };

    loop {
        let answer = console.prompt(&question)?;
        let answer = answer.trim();
        if answer.is_empty() {
            if let Some(rate) = fallback {
                return Ok(rate);
            }
        }
        match answer.parse::<u32>() {
            Ok(rate) => return Ok(rate),
            Err(_) => console.say("Wrong response type, try again !".red())?,
        }
    }
}

/// Settle the port and baud rate for a run, preferring configured defaults
pub fn resolve_session<S, R, W>(
    config: &AppConfig,
    source: &mut S,
    console: &mut Console<R, W>,
    baud_fallback: Option<u32>,
) -> Result<SessionConfig>
where
    S: PortSource + ?Sized,
    R: BufRead,
    W: Write,
{
    let port = match config.default_port.as_deref() {
        Some(default) if source.list_ports()?.iter().any(|p| p == default) => {
            console.say(format!(
                "{} Using default serial port: {}",
                "[*]".cyan().bold(),
                default
            ))?;
            default.to_string()
        }
        Some(default) => {
            console.say(format!(
                "{} Default serial port {} is not available",
                "[WARNING]".yellow().bold(),
                default
            ))?;
            choose_port(source, console)?
        }
        None => {
            log::info!("no default serial port configured");
            choose_port(source, console)?
        }
    };

    let baud_rate = match config.default_baud_rate {
        Some(rate) => {
            console.say(format!("{} Using default baudrate: {}", "[*]".cyan().bold(), rate))?;
            rate
        }
        None => choose_baud_rate(console, baud_fallback)?,
    };

    let session = SessionConfig::new(port, baud_rate);
    log::info!("session resolved: {}", session);
    Ok(session)
}
