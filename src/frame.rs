//! Decoded frame container.
//!
//! A `Frame` is one decoded image handed to the detector layer. Decoding
//! itself (codecs, camera capture) lives behind the `ingest` boundary; the
//! analysis pipeline only ever sees this container.

/// One decoded frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Interleaved RGB pixel data, row-major.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Position of this frame in its stream, starting at 0.
    pub index: u64,
    /// Stream time of this frame in seconds. For file sources this is
    /// derived from the frame index and target fps; for live sources it is
    /// a monotonic wall-clock reading. Must be non-decreasing per stream.
    pub timestamp_secs: f64,
}

impl Frame {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, index: u64, timestamp_secs: f64) -> Self {
        Self {
            pixels,
            width,
            height,
            index,
            timestamp_secs,
        }
    }

    /// Byte length of the pixel buffer (for buffer accounting).
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}
