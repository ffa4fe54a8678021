use std::sync::Arc;

use crate::foundation::error::PoseplayResult;
use crate::playback::clip::ClipMetadata;
use crate::render::frame::FrameRGBA;

/// A decoded frame and the clip time it was decoded for.
#[derive(Clone, Debug)]
pub struct VideoFrame {
    /// Clip time in seconds.
    pub time_secs: f64,
    /// Straight-alpha pixels, shared between the renderer and the pose worker.
    pub image: Arc<FrameRGBA>,
}

/// Events raised by the media collaborator.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    /// Metadata is loaded; the clip is operational.
    Ready(ClipMetadata),
    /// Playback reached the natural end of a non-looping run.
    Ended,
}

/// Media collaborator that decodes frames of one selected clip.
pub trait VideoSource: Send {
    /// Metadata of the selected alternate.
    fn metadata(&self) -> &ClipMetadata;

    /// Decode the frame displayed at `time_secs`.
    fn frame_at(&mut self, time_secs: f64) -> PoseplayResult<VideoFrame>;
}
