//! Startup configuration
//!
//! Built once in `main` from built-in defaults, an optional TOML file and
//! command-line/environment overrides, then passed down by value.

use crate::error::{LoopbackError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Baud rate used when the operator leaves the session prompt empty
pub const FALLBACK_BAUD_RATE: u32 = 230400;

/// Baud rate the self-test uses unless told otherwise
pub const SELFTEST_BAUD_RATE: u32 = 115200;

/// Sixteen bytes, 0x00 through 0x0f
pub const DEFAULT_TEST_VECTOR: &str = "000102030405060708090a0b0c0d0e0f";

/// Pause after opening a port before any I/O
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Port to use without prompting, if it is currently available
    pub default_port: Option<String>,
    /// Baud rate to use without prompting
    pub default_baud_rate: Option<u32>,
    /// Let the self-test ask for a baud rate instead of assuming 115200
    pub ask_baud_rate: bool,
    /// Answer to an empty baud rate prompt
    pub fallback_baud_rate: u32,
    /// Hex literal sent by the self-test
    pub test_vector: String,
    pub settle_delay_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_port: None,
            default_baud_rate: None,
            ask_baud_rate: false,
            fallback_baud_rate: FALLBACK_BAUD_RATE,
            test_vector: DEFAULT_TEST_VECTOR.to_string(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    /// Load a config file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| LoopbackError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::parse_content(&content, path)
    }

    pub fn parse_content(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| LoopbackError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Apply command-line or environment overrides on top of the file values
    pub fn with_overrides(mut self, port: Option<String>, baud_rate: Option<u32>) -> Self {
        if port.is_some() {
            self.default_port = port;
        }
        if baud_rate.is_some() {
            self.default_baud_rate = baud_rate;
        }
        self
    }

    /// Without a configured rate the self-test uses 115200, unless
    /// `ask_baud_rate` is set, in which case the operator is asked.
    pub fn for_selftest(mut self) -> Self {
        if !self.ask_baud_rate {
            self.default_baud_rate.get_or_insert(SELFTEST_BAUD_RATE);
        }
        self
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Port and baud rate, resolved once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub port: String,
    pub baud_rate: u32,
}

impl SessionConfig {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
        }
    }
}

impl fmt::Display for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {} baud", self.port, self.baud_rate)
    }
}
