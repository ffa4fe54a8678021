//! Canvas capture and recording collaborators.
//!
//! Recorders consume canvas frames in tick order and emit encoded chunks through the inbox.

/// `ffmpeg`-based recorder (WebM/MP4 streamed to stdout).
pub mod ffmpeg;
/// In-memory capture host for tests and dry runs.
pub mod memory;
/// Capture host and recorder contracts.
pub mod recorder;
