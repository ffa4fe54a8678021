//! Player configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) yields the stock player:
//! a 1080x720 canvas, 24 fps frame stepping, a 60 Hz render tick and WebM export.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{PoseplayError, PoseplayResult};

/// Top-level player configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Canvas the overlay is drawn onto (and the recorder captures).
    pub canvas: Canvas,
    /// Nominal frame rate used by frame stepping. The container's real rate is never consulted.
    pub step_frame_rate: u32,
    /// Render ticks per second ("display refresh").
    pub tick_rate: u32,
    /// Canvas clear colour.
    pub background: Rgba8,
    /// Overlay styling.
    pub overlay: OverlayStyle,
    /// Options handed to the pose estimator.
    pub estimator: EstimatorConfig,
    /// Recorder options.
    pub recorder: RecorderConfig,
    /// Suffix appended to the clip basename for exported files.
    pub output_suffix: String,
    /// Decoded frames kept by the media source.
    pub frame_cache_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1080,
                height: 720,
            },
            step_frame_rate: 24,
            tick_rate: 60,
            background: Rgba8::grey(150),
            overlay: OverlayStyle::default(),
            estimator: EstimatorConfig::default(),
            recorder: RecorderConfig::default(),
            output_suffix: "-clip".to_owned(),
            frame_cache_capacity: 64,
        }
    }
}

impl PlayerConfig {
    /// Load a JSON config file.
    pub fn from_json_file(path: &Path) -> PoseplayResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .map_err(|e| PoseplayError::validation(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check ranges that would otherwise surface as confusing collaborator failures.
    pub fn validate(&self) -> PoseplayResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(PoseplayError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(PoseplayError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        if self.canvas.width > u32::from(u16::MAX) || self.canvas.height > u32::from(u16::MAX) {
            return Err(PoseplayError::validation("canvas dimensions exceed u16"));
        }
        if self.step_frame_rate == 0 {
            return Err(PoseplayError::validation("step_frame_rate must be non-zero"));
        }
        if self.tick_rate == 0 {
            return Err(PoseplayError::validation("tick_rate must be non-zero"));
        }
        if self.frame_cache_capacity == 0 {
            return Err(PoseplayError::validation(
                "frame_cache_capacity must be non-zero",
            ));
        }
        self.overlay.validate()?;
        self.estimator.validate()?;
        self.recorder.validate()?;
        Ok(())
    }

    /// Frame rate used by [`crate::PlaybackController::step_frame`].
    pub fn step_fps(&self) -> PoseplayResult<Fps> {
        Fps::whole(self.step_frame_rate)
    }

    /// Render tick rate.
    pub fn tick_fps(&self) -> PoseplayResult<Fps> {
        Fps::whole(self.tick_rate)
    }
}

/// Keypoint, skeleton and scrub-track styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayStyle {
    /// Keypoints are drawn only when their score is strictly greater than this.
    pub keypoint_threshold: f32,
    /// Keypoint circle diameter in pixels.
    pub keypoint_diameter: f64,
    /// Keypoint fill colour.
    pub keypoint_fill: Rgba8,
    /// Keypoint outline colour.
    pub keypoint_outline: Rgba8,
    /// Keypoint outline width in pixels.
    pub keypoint_outline_width: f64,
    /// Skeleton edge colour.
    pub skeleton_color: Rgba8,
    /// Skeleton edge width in pixels.
    pub skeleton_width: f64,
    /// Height of the scrub track along the bottom edge.
    pub scrub_track_height: f64,
    /// Scrub track colour.
    pub scrub_track_color: Rgba8,
    /// Width of the playhead marker on the scrub track.
    pub scrub_marker_width: f64,
    /// Playhead marker colour.
    pub scrub_marker_color: Rgba8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            keypoint_threshold: 0.2,
            keypoint_diameter: 8.0,
            keypoint_fill: Rgba8::WHITE,
            keypoint_outline: Rgba8::grey(20),
            keypoint_outline_width: 4.0,
            skeleton_color: Rgba8::WHITE,
            skeleton_width: 1.0,
            scrub_track_height: 6.0,
            scrub_track_color: Rgba8([0, 0, 0, 96]),
            scrub_marker_width: 3.0,
            scrub_marker_color: Rgba8([255, 64, 64, 255]),
        }
    }
}

impl OverlayStyle {
    fn validate(&self) -> PoseplayResult<()> {
        if !(0.0..=1.0).contains(&self.keypoint_threshold) {
            return Err(PoseplayError::validation(
                "keypoint_threshold must be within [0, 1]",
            ));
        }
        for (name, v) in [
            ("keypoint_diameter", self.keypoint_diameter),
            ("keypoint_outline_width", self.keypoint_outline_width),
            ("skeleton_width", self.skeleton_width),
            ("scrub_track_height", self.scrub_track_height),
            ("scrub_marker_width", self.scrub_marker_width),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(PoseplayError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}

/// Options passed to the pose-estimation collaborator.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Input downscale factor applied by the model before inference.
    pub scale_factor: f32,
    /// Bodies whose overall score is below this are not reported.
    pub min_confidence: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            min_confidence: 0.1,
        }
    }
}

impl EstimatorConfig {
    fn validate(&self) -> PoseplayResult<()> {
        if !(self.scale_factor > 0.0 && self.scale_factor <= 1.0) {
            return Err(PoseplayError::validation(
                "estimator scale_factor must be within (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(PoseplayError::validation(
                "estimator min_confidence must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Container produced by the recorder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// WebM with VP8 video, streamable as it is written.
    #[default]
    Webm,
    /// Fragmented MP4 with H.264 video.
    Mp4,
}

impl ContainerFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

/// Recorder options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecorderConfig {
    /// Target video bitrate in bits per second.
    pub bitrate_bps: u32,
    /// Output container.
    pub container: ContainerFormat,
    /// Captured frames per emitted chunk for recorders that slice by frame count.
    pub timeslice_frames: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            bitrate_bps: 2_500_000,
            container: ContainerFormat::Webm,
            timeslice_frames: 30,
        }
    }
}

impl RecorderConfig {
    fn validate(&self) -> PoseplayResult<()> {
        if self.bitrate_bps == 0 {
            return Err(PoseplayError::validation("recorder bitrate_bps must be non-zero"));
        }
        if self.timeslice_frames == 0 {
            return Err(PoseplayError::validation(
                "recorder timeslice_frames must be non-zero",
            ));
        }
        Ok(())
    }
}
