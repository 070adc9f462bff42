//! Frame transport over a connector
//!
//! Every frame goes out as sixteen single-byte writes, payload first and
//! filler after it. Keep it that way: it is the pattern the device side
//! has been tested against.

use crate::config::SessionConfig;
use crate::error::{LoopbackError, Result};
use crate::serial::Connector;
use crate::transfer::chunk::{pad_frame, Frame, FRAME_SIZE};
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

pub struct Transport<C> {
    connector: C,
    settle_delay: Duration,
}

impl<C: Connector> Transport<C> {
    pub fn new(connector: C, settle_delay: Duration) -> Self {
        Self {
            connector,
            settle_delay,
        }
    }

    /// Open a connection, write one padded frame, close it
    pub fn write_chunk(&mut self, chunk: &[u8], session: &SessionConfig) -> Result<()> {
        let mut link = self.open(session)?;
        write_frame(&mut link, chunk).map_err(|e| LoopbackError::transport(&session.port, e))
    }

    /// Open a connection, read one full frame, close it
    pub fn read_chunk(&mut self, session: &SessionConfig) -> Result<Frame> {
        let mut link = self.open(session)?;
        read_frame(&mut link).map_err(|e| LoopbackError::transport(&session.port, e))
    }

    /// Write a chunk and read back the echoed frame, each on its own connection
    pub fn transfer(&mut self, chunk: &[u8], session: &SessionConfig) -> Result<Frame> {
        self.write_chunk(chunk, session)?;
        self.read_chunk(session)
    }

    /// Write a chunk and read the echo on a single connection
    pub fn exchange(&mut self, chunk: &[u8], session: &SessionConfig) -> Result<Frame> {
        let mut link = self.open(session)?;
        write_frame(&mut link, chunk)
            .and_then(|()| read_frame(&mut link))
            .map_err(|e| LoopbackError::transport(&session.port, e))
    }

    fn open(&mut self, session: &SessionConfig) -> Result<C::Link> {
        let link = self
            .connector
            .open(session)
            .map_err(|e| LoopbackError::transport(&session.port, e))?;
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }
        Ok(link)
    }
}

fn write_frame<W: Write>(link: &mut W, chunk: &[u8]) -> io::Result<()> {
    let frame = pad_frame(chunk).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("chunk of {} bytes exceeds the {}-byte frame", chunk.len(), FRAME_SIZE),
        )
    })?;

    for byte in frame {
        link.write_all(&[byte])?;
    }
    log::trace!("wrote frame {}", hex::encode(frame));
    link.flush()
}

fn read_frame<R: Read>(link: &mut R) -> io::Result<Frame> {
    let mut frame = [0u8; FRAME_SIZE];
    link.read_exact(&mut frame)?;
    log::trace!("read frame {}", hex::encode(frame));
    Ok(frame)
}
