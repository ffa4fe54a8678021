#![forbid(unsafe_code)]
//! `poseplay` is the core of a pose-overlay video player.
//!
//! A [`PlaybackController`] owns the media clock, a [`PoseStreamAdapter`] holds the latest pose
//! estimate, the [`OverlayRenderer`] draws video, scrub track and skeletons onto a
//! [`DrawSurface`], and the [`ExportPipeline`] records the drawn canvas through a
//! [`CaptureHost`] and delivers the assembled file to a [`DownloadSink`].
//!
//! Collaborators never mutate state directly. They post [`AppEvent`]s to an [`Inbox`] that the
//! [`PlayerSession`] drains once per render tick into the explicit [`AppState`].

pub mod capture;
pub mod config;
pub mod export;
pub(crate) mod foundation;
pub mod media;
pub mod playback;
pub mod pose;
pub mod render;
pub mod session;

pub use capture::ffmpeg::FfmpegCaptureHost;
pub use capture::memory::MemoryCaptureHost;
pub use capture::recorder::{CanvasRecorder, CanvasStream, CaptureHost, RecorderEvent};
pub use config::{ContainerFormat, EstimatorConfig, OverlayStyle, PlayerConfig, RecorderConfig};
pub use export::download::{DirectoryDownload, DownloadSink, InMemoryDownloads, export_filename};
pub use export::pipeline::{ExportPhase, ExportPipeline, ExportReport, ExportState};
pub use foundation::core::{Canvas, Fps, Point, Rect, Rgba8};
pub use foundation::error::{PoseplayError, PoseplayResult};
pub use media::ffmpeg::FfmpegVideoSource;
pub use media::source::{MediaEvent, VideoFrame, VideoSource};
pub use media::synthetic::SyntheticClip;
pub use playback::clip::{ClipMetadata, ClipState, Transport};
pub use playback::controller::{ClockSignal, ClockState, PlaybackController, StepDirection};
pub use pose::adapter::PoseStreamAdapter;
pub use pose::estimator::{EstimatorWorker, PoseEstimator};
pub use pose::model::{Keypoint, PoseResult, PoseResultSet};
pub use pose::track::{PoseTrack, TrackEstimator};
pub use render::cpu::CpuSurface;
pub use render::frame::FrameRGBA;
pub use render::overlay::{OverlayRenderer, OverlayToggles};
pub use render::surface::{DrawOp, DrawSurface, RecordingSurface, StrokeStyle};
pub use session::inbox::{AppEvent, Inbox, InboxSender};
pub use session::player::PlayerSession;
pub use session::state::{AppState, Control};
