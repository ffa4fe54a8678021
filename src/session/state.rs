use std::path::PathBuf;

use crate::config::PlayerConfig;
use crate::export::pipeline::{ExportPipeline, ExportReport};
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::media::source::MediaEvent;
use crate::playback::controller::{PlaybackController, StepDirection};
use crate::pose::adapter::PoseStreamAdapter;
use crate::render::frame::FrameRGBA;
use crate::render::overlay::OverlayToggles;
use crate::session::inbox::AppEvent;

/// User-facing controls.
#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    PlayPause,
    ToggleVideo,
    TogglePose,
    PrevFrame,
    NextFrame,
    /// Seek to a fraction of the clip (scrub track click).
    Seek(f64),
    /// Write the most recently drawn canvas as a PNG.
    SaveFrame(PathBuf),
    StartExport,
    StopRecording,
}

/// All mutable application state, passed explicitly into every tick and event handler.
pub struct AppState {
    pub controller: PlaybackController,
    pub poses: PoseStreamAdapter,
    pub toggles: OverlayToggles,
    pub export: ExportPipeline,
    canvas: Canvas,
    capture_fps: Fps,
    background: Rgba8,
    last_canvas: Option<FrameRGBA>,
}

impl AppState {
    pub fn new(cfg: &PlayerConfig, export: ExportPipeline) -> PoseplayResult<Self> {
        cfg.validate()?;
        Ok(Self {
            controller: PlaybackController::new(cfg.step_fps()?),
            poses: PoseStreamAdapter::new(),
            toggles: OverlayToggles::default(),
            export,
            canvas: cfg.canvas,
            capture_fps: cfg.tick_fps()?,
            background: cfg.background,
            last_canvas: None,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Canvas drawn by the latest tick.
    pub fn last_canvas(&self) -> Option<&FrameRGBA> {
        self.last_canvas.as_ref()
    }

    pub(crate) fn set_last_canvas(&mut self, frame: FrameRGBA) {
        self.last_canvas = Some(frame);
    }

    /// Merge one collaborator event. Returns the report when an export completes.
    pub fn handle_event(&mut self, event: AppEvent) -> PoseplayResult<Option<ExportReport>> {
        match event {
            AppEvent::Media(MediaEvent::Ready(meta)) => {
                self.controller.on_ready(meta)?;
                Ok(None)
            }
            AppEvent::Media(MediaEvent::Ended) => {
                self.export.on_media_ended()?;
                Ok(None)
            }
            AppEvent::Pose(set) => {
                self.poses.on_result(set);
                Ok(None)
            }
            AppEvent::Recorder(event) => self.export.on_recorder_event(event),
        }
    }

    /// Apply a user control.
    pub fn apply_control(&mut self, control: Control) -> PoseplayResult<()> {
        match control {
            Control::PlayPause => {
                // An export plays its run once; resuming mid-export must not re-enable looping.
                if self.export.is_idle() || self.controller.is_playing() {
                    self.controller.toggle_play_pause()?;
                } else {
                    self.controller.play_once()?;
                }
            }
            Control::ToggleVideo => {
                self.toggles.toggle_video();
            }
            Control::TogglePose => {
                self.toggles.toggle_pose();
            }
            Control::PrevFrame => {
                self.controller.step_frame(StepDirection::Backward)?;
            }
            Control::NextFrame => {
                self.controller.step_frame(StepDirection::Forward)?;
            }
            Control::Seek(fraction) => {
                self.controller.seek_to(fraction)?;
            }
            Control::SaveFrame(path) => {
                let frame = self
                    .last_canvas
                    .as_ref()
                    .ok_or_else(|| PoseplayError::not_ready("no frame has been drawn yet"))?;
                frame.save_png(&path, self.background.0)?;
                tracing::info!(path = %path.display(), "frame saved");
            }
            Control::StartExport => {
                self.export
                    .start_export(&mut self.controller, self.canvas, self.capture_fps)?;
            }
            Control::StopRecording => {
                self.export.stop_recording(&mut self.controller)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
