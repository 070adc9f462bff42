//! In-memory loopback device for tests

use crate::config::SessionConfig;
use crate::serial::Connector;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;

#[derive(Default)]
struct EchoState {
    pending: VecDeque<u8>,
    opens: usize,
    closes: usize,
    write_sizes: Vec<usize>,
    written: Vec<u8>,
    fail_open: bool,
    drop_echo: bool,
    corrupt_at: Option<usize>,
    fail_write_at: Option<usize>,
}

/// Echoes every written byte back on the next read, across connections.
/// Clones share state so a test can inspect traffic after handing one
/// clone to a transport.
#[derive(Clone, Default)]
pub struct EchoConnector {
    state: Rc<RefCell<EchoState>>,
}

impl EchoConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every open
    pub fn fail_open(self) -> Self {
        self.state.borrow_mut().fail_open = true;
        self
    }

    /// Accept writes but never answer
    pub fn drop_echo(self) -> Self {
        self.state.borrow_mut().drop_echo = true;
        self
    }

    /// Flip the bits of the n-th byte ever written before echoing it
    pub fn corrupt_byte(self, index: usize) -> Self {
        self.state.borrow_mut().corrupt_at = Some(index);
        self
    }

    /// Fail the n-th write call (counting from 0) with a broken pipe
    pub fn fail_write_at(self, call: usize) -> Self {
        self.state.borrow_mut().fail_write_at = Some(call);
        self
    }

    pub fn opens(&self) -> usize {
        self.state.borrow().opens
    }

    pub fn closes(&self) -> usize {
        self.state.borrow().closes
    }

    pub fn write_calls(&self) -> usize {
        self.state.borrow().write_sizes.len()
    }

    pub fn write_sizes(&self) -> Vec<usize> {
        self.state.borrow().write_sizes.clone()
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.borrow().written.clone()
    }
}

pub struct EchoLink {
    state: Rc<RefCell<EchoState>>,
}

impl Connector for EchoConnector {
    type Link = EchoLink;

    fn open(&mut self, _session: &SessionConfig) -> io::Result<EchoLink> {
        let mut state = self.state.borrow_mut();
        if state.fail_open {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such device"));
        }
        state.opens += 1;
        Ok(EchoLink {
            state: Rc::clone(&self.state),
        })
    }
}

impl Write for EchoLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.fail_write_at == Some(state.write_sizes.len()) {
            state.write_sizes.push(0);
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone"));
        }
        state.write_sizes.push(buf.len());
        for &byte in buf {
            let index = state.written.len();
            state.written.push(byte);
            if state.drop_echo {
                continue;
            }
            let echoed = if state.corrupt_at == Some(index) {
                !byte
            } else {
                byte
            };
            state.pending.push_back(echoed);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for EchoLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        let n = buf.len().min(state.pending.len());
        for slot in buf.iter_mut().take(n) {
            *slot = state.pending.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

impl Drop for EchoLink {
    fn drop(&mut self) {
        self.state.borrow_mut().closes += 1;
    }
}
