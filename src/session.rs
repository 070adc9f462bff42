//! Interactive text session
//!
//! Reads a line, sends it frame by frame and prints what came back. Runs
//! until standard input is closed.

use crate::config::SessionConfig;
use crate::console::Console;
use crate::error::{LoopbackError, Result};
use crate::serial::Connector;
use crate::transfer::{split, Frame, Transport, FRAME_SIZE};
use chrono::Local;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Timestamped record of every frame sent and received
pub struct Transcript {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Transcript {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| LoopbackError::Transcript {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&mut self, direction: &str, index: usize, bytes: &[u8]) -> io::Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        writeln!(
            self.writer,
            "[{}] {} chunk {}: {}",
            timestamp,
            direction,
            index,
            hex::encode(bytes)
        )?;
        self.writer.flush()
    }
}

/// Rebuild the operator's text from echoed frames.
///
/// Frames are decoded as UTF-8 and cut to `char_len` characters, which drops
/// the decoded filler of a short final frame.
pub fn reconstruct(frames: &[Frame], char_len: usize) -> String {
    let bytes = frames.concat();
    String::from_utf8_lossy(&bytes).chars().take(char_len).collect()
}

/// Send one line of text and return the reconstructed echo
pub fn send_text<C, R, W>(
    text: &str,
    transport: &mut Transport<C>,
    session: &SessionConfig,
    console: &mut Console<R, W>,
    mut transcript: Option<&mut Transcript>,
) -> Result<String>
where
    C: Connector,
    R: BufRead,
    W: Write,
{
    let payload = text.as_bytes();
    console.say(format!("Encoded text: {}", hex::encode(payload)))?;

    let chunks = split(payload, FRAME_SIZE);
    console.say(format!("{} chunk(s) to send", chunks.len()))?;

    let mut frames = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        console.print(format!("Sending chunk {}: {} -> ", i, hex::encode(chunk)))?;
        let frame = match transport.transfer(chunk, session) {
            Ok(frame) => frame,
            Err(e) => {
                console.say("")?;
                return Err(e);
            }
        };
        console.say(hex::encode(frame))?;

        if let Some(file) = transcript.as_deref_mut() {
            if let Err(e) = file
                .record("TX", i, chunk)
                .and_then(|()| file.record("RX", i, &frame))
            {
                log::warn!("failed to write transcript {}: {}", file.path().display(), e);
            }
        }

        frames.push(frame);
    }

    Ok(reconstruct(&frames, text.chars().count()))
}

/// Run the session loop until input closes.
///
/// A failed transfer abandons the current line only; the operator gets the
/// error and the next prompt.
pub fn run<C, R, W>(
    transport: &mut Transport<C>,
    session: &SessionConfig,
    console: &mut Console<R, W>,
    mut transcript: Option<Transcript>,
) -> Result<()>
where
    C: Connector,
    R: BufRead,
    W: Write,
{
    while let Some(text) = console.ask("Text to send ?")? {
        match send_text(&text, transport, session, console, transcript.as_mut()) {
            Ok(output) => {
                console.say(format!("Output text:\n\"{}\"", output))?;
            }
            Err(e @ LoopbackError::Transport { .. }) => {
                log::error!("{}", e);
                console.say(format!("{} {}", "[ERROR]".red().bold(), e))?;
            }
            Err(e) => return Err(e),
        }
        console.say("")?;
    }

    log::info!("input closed, ending session");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{captured, scripted};
    use crate::transfer::testing::EchoConnector;
    use std::time::Duration;

    fn session() -> SessionConfig {
        SessionConfig::new("/dev/ttyTEST0", 230400)
    }

    #[test]
    fn test_short_text_single_chunk() {
        let connector = EchoConnector::new();
        let mut transport = Transport::new(connector.clone(), Duration::ZERO);
        let mut console = scripted("");

        let output = send_text("helloworld", &mut transport, &session(), &mut console, None).unwrap();

        assert_eq!(output, "helloworld");
        assert_eq!(connector.written(), b"helloworld000000".to_vec());
        assert!(captured(&console).contains("1 chunk(s) to send"));
        assert!(captured(&console)
            .contains("Sending chunk 0: 68656c6c6f776f726c64 -> 68656c6c6f776f726c64303030303030"));
    }

    #[test]
    fn test_multi_chunk_text() {
        let connector = EchoConnector::new();
        let mut transport = Transport::new(connector.clone(), Duration::ZERO);
        let mut console = scripted("");
        let text = "The quick brown fox jumps";

        let output = send_text(text, &mut transport, &session(), &mut console, None).unwrap();

        assert_eq!(output, text);
        assert_eq!(connector.opens(), 4);
        assert_eq!(connector.write_calls(), 32);
    }

    #[test]
    fn test_multibyte_text_truncates_by_characters() {
        let connector = EchoConnector::new();
        let mut transport = Transport::new(connector, Duration::ZERO);
        let mut console = scripted("");

        let output = send_text("héllo", &mut transport, &session(), &mut console, None).unwrap();
        assert_eq!(output, "héllo");
    }

    #[test]
    fn test_reconstruct_drops_filler() {
        let mut frame = [b'0'; FRAME_SIZE];
        frame[..10].copy_from_slice(b"0123456789");
        assert_eq!(reconstruct(&[frame], 10), "0123456789");
        assert_eq!(reconstruct(&[], 0), "");
    }

    #[test]
    fn test_empty_line_sends_nothing() {
        let connector = EchoConnector::new();
        let mut transport = Transport::new(connector.clone(), Duration::ZERO);
        let mut console = scripted("");

        let output = send_text("", &mut transport, &session(), &mut console, None).unwrap();
        assert_eq!(output, "");
        assert_eq!(connector.opens(), 0);
    }

    #[test]
    fn test_loop_runs_until_input_closes() {
        let connector = EchoConnector::new();
        let mut transport = Transport::new(connector, Duration::ZERO);
        let mut console = scripted("first\nsecond\n");

        run(&mut transport, &session(), &mut console, None).unwrap();

        let output = captured(&console);
        assert_eq!(output.matches("Text to send ?").count(), 3);
        assert!(output.contains("\"first\""));
        assert!(output.contains("\"second\""));
    }

    #[test]
    fn test_transfer_error_keeps_loop_alive() {
        let connector = EchoConnector::new().drop_echo();
        let mut transport = Transport::new(connector, Duration::ZERO);
        let mut console = scripted("lost\nalso lost\n");

        run(&mut transport, &session(), &mut console, None).unwrap();

        let output = captured(&console);
        assert_eq!(output.matches("serial transfer on /dev/ttyTEST0 failed").count(), 2);
        assert!(!output.contains("Output text"));
    }

    #[test]
    fn test_failed_chunk_is_named_before_the_error() {
        let connector = EchoConnector::new().drop_echo();
        let mut transport = Transport::new(connector, Duration::ZERO);
        let mut console = scripted("lost\n");

        run(&mut transport, &session(), &mut console, None).unwrap();

        let output = captured(&console);
        let chunk = output.find("Sending chunk 0: 6c6f7374 -> \n").unwrap();
        let error = output.find("serial transfer on /dev/ttyTEST0 failed").unwrap();
        assert!(chunk < error);
    }

    #[test]
    fn test_transcript_records_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        let mut transcript = Transcript::create(&path).unwrap();

        let connector = EchoConnector::new();
        let mut transport = Transport::new(connector, Duration::ZERO);
        let mut console = scripted("");
        send_text("hi", &mut transport, &session(), &mut console, Some(&mut transcript)).unwrap();
        drop(transcript);

        let log = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("TX chunk 0: 6869"));
        assert!(lines[1].ends_with("RX chunk 0: 68693030303030303030303030303030"));
    }
}
