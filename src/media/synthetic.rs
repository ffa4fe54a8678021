use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::media::source::{VideoFrame, VideoSource};
use crate::playback::clip::ClipMetadata;
use crate::render::frame::FrameRGBA;

/// Deterministic generated clip for tests and dry runs.
///
/// Every frame is a dark field with a bright vertical bar whose x position tracks the clip time,
/// so a frame's content identifies the time it was decoded for.
#[derive(Clone, Debug)]
pub struct SyntheticClip {
    meta: ClipMetadata,
    decoded: usize,
}

impl SyntheticClip {
    /// A clip of `duration_secs` with frames of `canvas` size.
    pub fn new(
        source_uri: impl Into<String>,
        canvas: Canvas,
        duration_secs: f64,
    ) -> PoseplayResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(PoseplayError::validation("synthetic clip needs a non-empty canvas"));
        }
        Ok(Self {
            meta: ClipMetadata {
                source_uri: source_uri.into(),
                width: canvas.width,
                height: canvas.height,
                duration_secs,
            },
            decoded: 0,
        })
    }

    /// Number of frames decoded so far.
    pub fn decoded_frames(&self) -> usize {
        self.decoded
    }

    /// Column the bar occupies at `time_secs`.
    pub fn bar_column(&self, time_secs: f64) -> u32 {
        let fraction = (time_secs / self.meta.duration_secs).clamp(0.0, 1.0);
        let max_x = self.meta.width.saturating_sub(1);
        ((fraction * f64::from(max_x)).round() as u32).min(max_x)
    }
}

impl VideoSource for SyntheticClip {
    fn metadata(&self) -> &ClipMetadata {
        &self.meta
    }

    fn frame_at(&mut self, time_secs: f64) -> PoseplayResult<VideoFrame> {
        let mut frame = FrameRGBA::solid(self.meta.width, self.meta.height, [16, 24, 32, 255]);
        let bar = self.bar_column(time_secs) as usize;
        let stride = self.meta.width as usize * 4;
        for row in frame.data.chunks_exact_mut(stride) {
            row[bar * 4..bar * 4 + 4].copy_from_slice(&[240, 240, 96, 255]);
        }
        self.decoded += 1;
        Ok(VideoFrame {
            time_secs,
            image: Arc::new(frame),
        })
    }
}
