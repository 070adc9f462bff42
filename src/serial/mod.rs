//! Serial port access for the loopback link
//!
//! This module provides functionality for:
//! - Discovering serial ports that can currently be opened
//! - Opening short-lived connections for frame writes and reads

pub mod enumerate;
pub mod port;

pub use enumerate::{PortSource, SystemPorts};
pub use port::{Connector, SerialConnector};
