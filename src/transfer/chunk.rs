//! Fixed-size chunking and frame padding

/// Bytes per frame in each direction
pub const FRAME_SIZE: usize = 16;

/// Filler for the unused tail of a short frame (ASCII '0')
pub const FILLER: u8 = b'0';

pub type Frame = [u8; FRAME_SIZE];

/// Split a payload into contiguous chunks of `chunk_size` bytes.
///
/// Every chunk but the last is exactly `chunk_size` long; the last holds the
/// remainder. An empty payload yields no chunks.
///
/// # Panics
///
/// Panics if `chunk_size` is 0.
pub fn split(payload: &[u8], chunk_size: usize) -> Vec<&[u8]> {
    payload.chunks(chunk_size).collect()
}

/// Build the on-wire frame for a chunk: its bytes, then filler up to
/// [`FRAME_SIZE`]. Returns `None` if the chunk does not fit in one frame.
pub fn pad_frame(chunk: &[u8]) -> Option<Frame> {
    if chunk.len() > FRAME_SIZE {
        return None;
    }
    let mut frame = [FILLER; FRAME_SIZE];
    frame[..chunk.len()].copy_from_slice(chunk);
    Some(frame)
}
