//! Media collaborators: clip selection, probing and frame decode.

/// `ffprobe`/`ffmpeg` backed video source.
pub mod ffmpeg;
/// Generated clip for tests and dry runs.
pub mod synthetic;
/// The video source contract.
pub mod source;
