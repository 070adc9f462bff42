//! Chunked transport of fixed 16-byte frames
//!
//! Payloads are cut into 16-byte chunks; each chunk travels as one frame,
//! padded with ASCII '0' when short, and the device echoes one frame back.

pub mod chunk;
pub mod transport;

#[cfg(test)]
pub mod testing;

pub use chunk::{split, Frame, FRAME_SIZE};
pub use transport::Transport;
