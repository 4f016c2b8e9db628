//! Frame ingestion sources.
//!
//! Sources produce `Frame` instances that flow into a stream session:
//! - Local video files
//! - Stub synthetic streams (testing, demos)
//!
//! The ingestion layer is responsible for:
//! - Stamping frame indices and stream timestamps at capture time
//! - Refusing remote URL schemes (local-only ingestion)
//!
//! The ingestion layer MUST NOT:
//! - Store frames to disk
//! - Transmit frames over network

pub mod file;

pub use file::FileSource;

use anyhow::Result;

use crate::frame::Frame;

/// A source of frames for one stream.
pub trait FrameSource: Send {
    /// Open the underlying stream. Must be called before `next_frame`.
    fn connect(&mut self) -> Result<()>;

    /// Capture the next frame. `Ok(None)` means clean end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Whether the source is still usable.
    fn is_healthy(&self) -> bool;

    fn stats(&self) -> SourceStats;
}

/// Capture statistics for a source.
#[derive(Clone, Debug)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub path: String,
}
