//! Serial port discovery
//!
//! Candidate device names come from a fixed per-platform namespace; only the
//! ones that can actually be opened are reported.

use crate::error::{LoopbackError, Result};
use crate::serial::port::probe_port;
use colored::Colorize;

/// Number of `COMn` names probed on Windows
pub const WINDOWS_COM_PORTS: usize = 256;

/// Where candidate port names come from on a given OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSet {
    /// `COM1` .. `COM<count>`
    Numbered { prefix: &'static str, count: usize },
    /// Device nodes matching a glob pattern
    Glob(&'static str),
}

impl CandidateSet {
    /// Pick the candidate set for an OS name as reported by `std::env::consts::OS`
    pub fn for_os(os: &str) -> Result<Self> {
        match os {
            "windows" => Ok(CandidateSet::Numbered {
                prefix: "COM",
                count: WINDOWS_COM_PORTS,
            }),
            // `[A-Za-z]` keeps the controlling terminal /dev/tty out
            "linux" | "cygwin" => Ok(CandidateSet::Glob("/dev/tty[A-Za-z]*")),
            "macos" => Ok(CandidateSet::Glob("/dev/tty.*")),
            other => Err(LoopbackError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn names(&self) -> Vec<String> {
        match self {
            CandidateSet::Numbered { prefix, count } => {
                (1..=*count).map(|i| format!("{}{}", prefix, i)).collect()
            }
            CandidateSet::Glob(pattern) => match glob::glob(pattern) {
                Ok(paths) => paths
                    .filter_map(|entry| entry.ok())
                    .map(|path| path.to_string_lossy().into_owned())
                    .collect(),
                Err(e) => {
                    log::warn!("bad device pattern {}: {}", pattern, e);
                    Vec::new()
                }
            },
        }
    }
}

/// Something that can report the currently usable serial ports
pub trait PortSource {
    fn list_ports(&mut self) -> Result<Vec<String>>;
}

/// Ports on this machine
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPorts;

impl PortSource for SystemPorts {
    fn list_ports(&mut self) -> Result<Vec<String>> {
        list_ports()
    }
}

/// List the serial ports that can be opened right now
pub fn list_ports() -> Result<Vec<String>> {
    let candidates = CandidateSet::for_os(std::env::consts::OS)?;
    Ok(filter_openable(candidates.names(), probe_port))
}

/// Keep the candidates the probe accepts, in their original order
pub fn filter_openable<F>(candidates: Vec<String>, mut probe: F) -> Vec<String>
where
    F: FnMut(&str) -> bool,
{
    let total = candidates.len();
    let ports: Vec<String> = candidates.into_iter().filter(|c| probe(c)).collect();
    log::debug!("{} of {} candidate ports can be opened", ports.len(), total);
    ports
}

/// Print formatted list of available serial ports
pub fn print_ports() -> Result<()> {
    let ports = list_ports()?;

    if ports.is_empty() {
        println!("{}", "No serial ports found".yellow());
        println!("\n{}", "Troubleshooting tips:".cyan().bold());
        println!("  1. Connect the loopback device or USB-to-serial adapter");
        println!("  2. Make sure no other program holds the port open");
        println!("  3. Add your user to the 'dialout' group: sudo usermod -aG dialout $USER");
        return Ok(());
    }

    println!("{}", "Available Serial Ports:".green().bold());
    println!("{}", "=".repeat(60));
    for (i, port) in ports.iter().enumerate() {
        println!("  ({}) {}", i, port.white().bold());
    }
    println!("{}", "=".repeat(60));

    Ok(())
}
