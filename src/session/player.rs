use std::path::Path;
use std::time::Duration;

use crate::capture::recorder::CaptureHost;
use crate::config::PlayerConfig;
use crate::export::download::DownloadSink;
use crate::export::pipeline::{ExportPhase, ExportPipeline, ExportReport};
use crate::foundation::core::Fps;
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::media::source::{MediaEvent, VideoSource};
use crate::playback::controller::ClockSignal;
use crate::pose::estimator::{EstimatorWorker, PoseEstimator};
use crate::render::frame::FrameRGBA;
use crate::render::overlay::OverlayRenderer;
use crate::render::surface::DrawSurface;
use crate::session::inbox::{AppEvent, Inbox};
use crate::session::state::{AppState, Control};

/// Poll interval while waiting on collaborators between ticks.
const WAIT_SLICE: Duration = Duration::from_millis(250);

/// Headless player: owns the state, the inbox and the collaborators, and drives the render loop
/// on a simulated clock of one tick per `1 / tick_rate` seconds.
pub struct PlayerSession {
    state: AppState,
    inbox: Inbox,
    source: Box<dyn VideoSource>,
    estimator: Option<EstimatorWorker>,
    estimator_cfg: crate::config::EstimatorConfig,
    surface: Box<dyn DrawSurface>,
    renderer: OverlayRenderer,
    tick_fps: Fps,
    ticks: u64,
}

impl PlayerSession {
    /// Wire a session. The source's ready signal is queued and applied on the first tick.
    pub fn new(
        cfg: &PlayerConfig,
        source: Box<dyn VideoSource>,
        surface: Box<dyn DrawSurface>,
        capture: Box<dyn CaptureHost>,
        downloads: Box<dyn DownloadSink>,
    ) -> PoseplayResult<Self> {
        cfg.validate()?;
        if surface.canvas() != cfg.canvas {
            return Err(PoseplayError::validation(format!(
                "surface is {}x{}, config canvas is {}x{}",
                surface.canvas().width,
                surface.canvas().height,
                cfg.canvas.width,
                cfg.canvas.height
            )));
        }

        let inbox = Inbox::new();
        let export = ExportPipeline::new(
            capture,
            downloads,
            cfg.recorder,
            cfg.output_suffix.clone(),
            inbox.sender(),
        );
        let state = AppState::new(cfg, export)?;
        inbox
            .sender()
            .post(MediaEvent::Ready(source.metadata().clone()));

        Ok(Self {
            state,
            inbox,
            source,
            estimator: None,
            estimator_cfg: cfg.estimator,
            surface,
            renderer: OverlayRenderer::from_config(cfg),
            tick_fps: cfg.tick_fps()?,
            ticks: 0,
        })
    }

    /// Run `estimator` on a worker thread fed with every displayed frame it can keep up with.
    pub fn with_estimator(mut self, estimator: Box<dyn PoseEstimator>) -> PoseplayResult<Self> {
        self.estimator = Some(EstimatorWorker::spawn(
            estimator,
            self.estimator_cfg,
            self.inbox.sender(),
        )?);
        Ok(self)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Apply a control, dropping rejections that the player recovers from locally.
    pub fn control(&mut self, control: Control) -> PoseplayResult<()> {
        match self.state.apply_control(control.clone()) {
            Err(e) if e.is_recoverable_rejection() => {
                tracing::warn!(?control, error = %e, "control rejected");
                Ok(())
            }
            other => other,
        }
    }

    fn handle(&mut self, event: AppEvent) -> PoseplayResult<Option<ExportReport>> {
        match self.state.handle_event(event) {
            Err(e) if e.is_recoverable_rejection() => {
                tracing::warn!(error = %e, "event rejected");
                Ok(None)
            }
            other => other,
        }
    }

    fn drain_inbox(&mut self) -> PoseplayResult<Option<ExportReport>> {
        let mut report = None;
        for event in self.inbox.drain() {
            if let Some(done) = self.handle(event)? {
                report = Some(done);
            }
        }
        Ok(report)
    }

    /// One render tick: merge events, decode, estimate, draw and capture the current position,
    /// then advance the clock.
    ///
    /// The frame at the current time is drawn before the clock moves, so an export captures its
    /// starting frame. Returns the export report if an export completed while merging events.
    pub fn tick(&mut self) -> PoseplayResult<Option<ExportReport>> {
        let report = self.drain_inbox()?;

        let frame = match self.state.controller.clip() {
            Some(clip) => Some(self.source.frame_at(clip.current_time_secs)?),
            None => None,
        };
        if let (Some(worker), Some(frame)) = (&self.estimator, &frame) {
            worker.submit(frame.clone());
        }

        let poses = self.state.poses.latest();
        self.renderer.render(
            self.surface.as_mut(),
            self.state.controller.clip(),
            frame.as_ref().map(|f| f.image.as_ref()),
            &poses,
            self.state.toggles,
        )?;
        let canvas = self.surface.snapshot()?;
        self.state.export.push_frame(&canvas)?;
        self.state.set_last_canvas(canvas);

        if let Some(ClockSignal::Ended) = self
            .state
            .controller
            .advance(self.tick_fps.frame_duration_secs())
        {
            self.inbox.sender().post(MediaEvent::Ended);
        }

        self.ticks += 1;
        Ok(report)
    }

    fn ensure_ready(&mut self) -> PoseplayResult<()> {
        if !self.state.controller.is_ready() {
            self.drain_inbox()?;
        }
        if !self.state.controller.is_ready() {
            return Err(PoseplayError::not_ready("media source never reported ready"));
        }
        Ok(())
    }

    /// Export the annotated clip: record one pass from the start and deliver the file.
    ///
    /// Blocks until the recorder acknowledges the stop; a recorder that never does blocks forever.
    #[tracing::instrument(skip(self))]
    pub fn run_export(&mut self) -> PoseplayResult<ExportReport> {
        self.ensure_ready()?;
        self.state.apply_control(Control::StartExport)?;

        loop {
            match self.state.export.phase() {
                ExportPhase::Recording => {
                    if let Some(report) = self.tick()? {
                        return Ok(report);
                    }
                }
                ExportPhase::Finalizing => {
                    if let Some(event) = self.inbox.wait(WAIT_SLICE)
                        && let Some(report) = self.handle(event)?
                    {
                        return Ok(report);
                    }
                }
                ExportPhase::Idle => {
                    return Err(PoseplayError::media(
                        "export returned to idle without delivering a file",
                    ));
                }
            }
        }
    }

    /// Draw the annotated canvas at `time_secs`, waiting up to `pose_timeout` for the estimate of
    /// that frame when an estimator is attached.
    pub fn render_still(
        &mut self,
        time_secs: f64,
        pose_timeout: Duration,
    ) -> PoseplayResult<FrameRGBA> {
        self.ensure_ready()?;
        self.state.controller.pause()?;
        self.state.controller.seek_time(time_secs)?;

        if let Some(worker) = &self.estimator {
            let clip_time = self.state.controller.clip().map_or(0.0, |c| c.current_time_secs);
            let frame = self.source.frame_at(clip_time)?;
            if worker.submit(frame) {
                self.await_pose(pose_timeout)?;
            }
        }

        self.tick()?;
        self.state
            .last_canvas()
            .cloned()
            .ok_or_else(|| PoseplayError::not_ready("no frame has been drawn"))
    }

    fn await_pose(&mut self, timeout: Duration) -> PoseplayResult<()> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                tracing::warn!("pose estimate did not arrive in time; drawing without it");
                return Ok(());
            }
            let Some(event) = self.inbox.wait(remaining.min(WAIT_SLICE)) else {
                continue;
            };
            let is_pose = matches!(event, AppEvent::Pose(_));
            self.handle(event)?;
            if is_pose {
                return Ok(());
            }
        }
    }

    /// Save the most recently drawn canvas as a PNG.
    pub fn save_frame_png(&mut self, path: &Path) -> PoseplayResult<()> {
        self.state
            .apply_control(Control::SaveFrame(path.to_path_buf()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/player.rs"]
mod tests;
