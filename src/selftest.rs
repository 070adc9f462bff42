//! Single-frame loopback self-test
//!
//! Sends a fixed 16-byte vector once and checks the echo byte for byte.

use crate::config::AppConfig;
use crate::console::{resolve_session, Console};
use crate::error::{MalformedPayload, Result};
use crate::serial::{Connector, PortSource};
use crate::transfer::{Frame, Transport, FRAME_SIZE};
use colored::Colorize;
use std::fmt;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Fail,
}

impl Verdict {
    pub fn passed(self) -> bool {
        self == Verdict::Success
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "SUCCESS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Parse the test vector: exactly 32 hex characters
pub fn parse_test_vector(literal: &str) -> std::result::Result<Frame, MalformedPayload> {
    let expected = FRAME_SIZE * 2;
    let actual = literal.chars().count();
    if actual != expected {
        return Err(MalformedPayload::Length { expected, actual });
    }

    let mut frame = [0u8; FRAME_SIZE];
    hex::decode_to_slice(literal, &mut frame)?;
    Ok(frame)
}

/// Compare what came back with the vector that was sent
pub fn verdict(expected_hex: &str, received: &[u8]) -> Verdict {
    if hex::encode(received).eq_ignore_ascii_case(expected_hex) {
        Verdict::Success
    } else {
        Verdict::Fail
    }
}

/// Run the self-test. The vector is validated before any port is touched.
pub fn run<S, C, R, W>(
    config: &AppConfig,
    source: &mut S,
    transport: &mut Transport<C>,
    console: &mut Console<R, W>,
) -> Result<Verdict>
where
    S: PortSource + ?Sized,
    C: Connector,
    R: BufRead,
    W: Write,
{
    let payload = parse_test_vector(&config.test_vector)?;
    let session = resolve_session(config, source, console, None)?;

    console.say("")?;
    console.say(format!("Sending input data: \t{}", hex::encode(payload)))?;
    console.say("")?;

    let received = transport.exchange(&payload, &session)?;
    console.say(format!("Received data: \t\t{}", hex::encode(received)))?;

    let result = verdict(&config.test_vector, &received);
    let shown = match result {
        Verdict::Success => result.to_string().green().bold(),
        Verdict::Fail => result.to_string().red().bold(),
    };
    console.say(format!("\nLoopback test status: \t{}", shown))?;
    log::info!("self-test on {}: {}", session, result);

    Ok(result)
}
