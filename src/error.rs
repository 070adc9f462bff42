//! Error types for port discovery, console prompts and frame transfers

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons the fixed self-test vector can be rejected
#[derive(Debug, Error, PartialEq)]
pub enum MalformedPayload {
    #[error("test vector must be {expected} hex characters (16 bytes), got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("test vector is not valid hexadecimal: {0}")]
    Hex(#[from] hex::FromHexError),
}

#[derive(Debug, Error)]
pub enum LoopbackError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error(transparent)]
    MalformedPayload(#[from] MalformedPayload),

    #[error("serial transfer on {port} failed: {source}")]
    Transport {
        port: String,
        #[source]
        source: io::Error,
    },

    #[error("console I/O failed: {0}")]
    Console(#[source] io::Error),

    #[error("standard input closed")]
    InputClosed,

    #[error("failed to load config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to create transcript {}: {source}", .path.display())]
    Transcript {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoopbackError {
    pub fn transport(port: &str, source: io::Error) -> Self {
        LoopbackError::Transport {
            port: port.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoopbackError>;
