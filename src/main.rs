//! UART Loopback
//!
//! Exercises a serial loopback link with fixed 16-byte frames.
//!
//! # Usage
//!
//! ```bash
//! # List serial ports that can be opened right now
//! uart-loopback ports
//!
//! # Type text, send it in 16-byte frames and read back the echo
//! uart-loopback session
//!
//! # Send the fixed 16-byte test vector once and report SUCCESS/FAIL
//! uart-loopback selftest --port /dev/ttyUSB0 --baud 115200
//! ```
//!
//! Port and baud rate can also come from a TOML config file (`--config`)
//! or the `UART_LOOPBACK_PORT` / `UART_LOOPBACK_BAUD` environment variables.

mod config;
mod console;
mod error;
mod selftest;
mod serial;
mod session;
mod transfer;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use config::AppConfig;
use console::{print_banner, resolve_session, Console};
use serial::{SerialConnector, SystemPorts};
use session::Transcript;
use transfer::Transport;

/// UART Loopback
///
/// Send text or a fixed test vector over a serial loopback link
#[derive(Parser)]
#[command(name = "uart-loopback")]
#[command(version)]
#[command(about = "Serial loopback exerciser using fixed 16-byte frames")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with default port, baud rate and timings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial ports that can currently be opened
    Ports,

    /// Interactive text session: send lines and show the echoed text
    Session {
        #[command(flatten)]
        link: LinkArgs,

        /// Record every frame sent and received to a file
        #[arg(short, long)]
        log: Option<PathBuf>,
    },

    /// Send the test vector once and compare the echo
    Selftest {
        #[command(flatten)]
        link: LinkArgs,

        /// Test vector as 32 hex characters
        #[arg(long)]
        vector: Option<String>,
    },
}

#[derive(clap::Args)]
struct LinkArgs {
    /// Serial port to use if it is available (e.g., /dev/ttyUSB0, COM3)
    #[arg(short, long, env = "UART_LOOPBACK_PORT")]
    port: Option<String>,

    /// Baud rate; skips the baud rate prompt
    #[arg(short, long, env = "UART_LOOPBACK_BAUD")]
    baud: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = match cli.config {
        Some(ref path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Ports => {
            serial::enumerate::print_ports()?;
            Ok(())
        }
        Commands::Session { link, log } => {
            handle_session(config.with_overrides(link.port, link.baud), log.as_deref())
        }
        Commands::Selftest { link, vector } => {
            let mut config = config.with_overrides(link.port, link.baud).for_selftest();
            if let Some(vector) = vector {
                config.test_vector = vector;
            }
            handle_selftest(config)
        }
    }
}

fn handle_session(config: AppConfig, log_path: Option<&Path>) -> Result<()> {
    let mut console = Console::stdio();
    print_banner(&mut console, "echo session")?;

    let session = resolve_session(
        &config,
        &mut SystemPorts,
        &mut console,
        Some(config.fallback_baud_rate),
    )?;
    console.say("")?;

    let transcript = log_path.map(Transcript::create).transpose()?;
    if let Some(ref t) = transcript {
        console.say(format!(
            "{} Logging to: {}",
            "[LOG]".cyan().bold(),
            t.path().display()
        ))?;
    }

    let mut transport = Transport::new(
        SerialConnector::new(config.read_timeout()),
        config.settle_delay(),
    );
    session::run(&mut transport, &session, &mut console, transcript)
        .with_context(|| format!("session on {} ended", session))
}

fn handle_selftest(config: AppConfig) -> Result<()> {
    let mut console = Console::stdio();
    print_banner(&mut console, "loopback self-test")?;

    let mut transport = Transport::new(
        SerialConnector::new(config.read_timeout()),
        config.settle_delay(),
    );
    let verdict = selftest::run(&config, &mut SystemPorts, &mut transport, &mut console)?;

    std::process::exit(if verdict.passed() { 0 } else { 1 });
}
