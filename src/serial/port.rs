//! Serial port configuration and connection management
//!
//! Connections are short-lived: they are opened for a single frame write or
//! read and closed when dropped.

use crate::config::SessionConfig;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Configuration for serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., /dev/ttyUSB0, COM3)
    pub port_path: String,
    pub baud_rate: u32,
    /// Data bits (default: 8)
    pub data_bits: DataBits,
    /// Parity (default: None)
    pub parity: Parity,
    /// Stop bits (default: 1)
    pub stop_bits: StopBits,
    /// Flow control is never used on the loopback link
    pub flow_control: FlowControl,
    /// Read timeout
    pub timeout: Duration,
}

impl PortConfig {
    pub fn new(port_path: &str, baud_rate: u32) -> Self {
        Self {
            port_path: port_path.to_string(),
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: Duration::from_millis(crate::config::DEFAULT_READ_TIMEOUT_MS),
        }
    }

    /// Set the read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&SessionConfig> for PortConfig {
    fn from(session: &SessionConfig) -> Self {
        PortConfig::new(&session.port, session.baud_rate)
    }
}

/// An open serial port; closed on drop
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
    config: PortConfig,
}

impl SerialConnection {
    /// Open a serial connection with the given configuration
    pub fn open(config: PortConfig) -> io::Result<Self> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()?;

        log::debug!(
            "opened {} at {} baud",
            config.port_path,
            config.baud_rate
        );

        Ok(Self { port, config })
    }
}

impl Read for SerialConnection {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.port.read(buffer)
    }
}

impl Write for SerialConnection {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.port.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Drop for SerialConnection {
    fn drop(&mut self) {
        log::trace!("closing {}", self.config.port_path);
    }
}

/// Opens a byte link to the device named by a session
pub trait Connector {
    type Link: Read + Write;

    fn open(&mut self, session: &SessionConfig) -> io::Result<Self::Link>;
}

/// Connector for real serial hardware
#[derive(Debug, Clone)]
pub struct SerialConnector {
    timeout: Duration,
}

impl SerialConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for SerialConnector {
    type Link = SerialConnection;

    fn open(&mut self, session: &SessionConfig) -> io::Result<SerialConnection> {
        SerialConnection::open(PortConfig::from(session).with_timeout(self.timeout))
    }
}

/// Check that a port can be opened, closing it again immediately
pub fn probe_port(path: &str) -> bool {
    match serialport::new(path, 9600).open() {
        Ok(port) => {
            drop(port);
            true
        }
        Err(e) => {
            log::debug!("skipping {}: {}", path, e);
            false
        }
    }
}
