use std::path::PathBuf;

use crate::capture::recorder::{CanvasRecorder, CaptureHost, RecorderEvent};
use crate::config::RecorderConfig;
use crate::export::download::{DownloadSink, export_filename};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::playback::controller::PlaybackController;
use crate::render::frame::FrameRGBA;
use crate::session::inbox::InboxSender;

/// Chunks captured for one export run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingSession {
    /// Encoded segments in arrival order.
    pub captured_chunks: Vec<Vec<u8>>,
    /// Source URI the output filename is derived from.
    pub output_filename_base: String,
}

impl RecordingSession {
    fn new(output_filename_base: String) -> Self {
        Self {
            captured_chunks: Vec::new(),
            output_filename_base,
        }
    }

    fn assemble(&self) -> Vec<u8> {
        let total = self.captured_chunks.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(total);
        for chunk in &self.captured_chunks {
            out.extend_from_slice(chunk);
        }
        out
    }
}

/// A session together with the recorder feeding it.
pub struct ActiveExport {
    session: RecordingSession,
    recorder: Box<dyn CanvasRecorder>,
}

impl std::fmt::Debug for ActiveExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveExport")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Export lifecycle: `Idle -> Recording -> Finalizing -> Idle`.
#[derive(Debug, Default)]
pub enum ExportState {
    #[default]
    Idle,
    /// Capturing frames while the clip plays once through.
    Recording(ActiveExport),
    /// Stop requested; waiting for the recorder's acknowledgment.
    Finalizing(ActiveExport),
}

/// Field-less view of [`ExportState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Recording,
    Finalizing,
}

/// Outcome of a completed export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    /// Delivered filename, `<clip-basename><suffix>.<ext>`.
    pub filename: String,
    /// Where the download sink put it.
    pub path: PathBuf,
    /// Size of the assembled artifact.
    pub bytes: usize,
    /// Number of chunks that were concatenated.
    pub chunks: usize,
}

/// Records the drawn canvas while driving playback from start to end, then delivers the file.
pub struct ExportPipeline {
    state: ExportState,
    recorder_cfg: RecorderConfig,
    output_suffix: String,
    capture: Box<dyn CaptureHost>,
    downloads: Box<dyn DownloadSink>,
    events: InboxSender,
}

impl ExportPipeline {
    pub fn new(
        capture: Box<dyn CaptureHost>,
        downloads: Box<dyn DownloadSink>,
        recorder_cfg: RecorderConfig,
        output_suffix: impl Into<String>,
        events: InboxSender,
    ) -> Self {
        Self {
            state: ExportState::Idle,
            recorder_cfg,
            output_suffix: output_suffix.into(),
            capture,
            downloads,
            events,
        }
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    pub fn phase(&self) -> ExportPhase {
        match self.state {
            ExportState::Idle => ExportPhase::Idle,
            ExportState::Recording(_) => ExportPhase::Recording,
            ExportState::Finalizing(_) => ExportPhase::Finalizing,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ExportState::Idle)
    }

    /// Chunks captured so far in the current run; empty while idle.
    pub fn captured_chunks(&self) -> &[Vec<u8>] {
        match &self.state {
            ExportState::Idle => &[],
            ExportState::Recording(active) | ExportState::Finalizing(active) => {
                &active.session.captured_chunks
            }
        }
    }

    /// Start recording the canvas and play the clip once from the beginning.
    ///
    /// The clip is rewound and paused before the capture is opened, so a host without capture
    /// support leaves it paused at time 0.
    #[tracing::instrument(skip(self, controller), fields(phase = ?self.phase()))]
    pub fn start_export(
        &mut self,
        controller: &mut PlaybackController,
        canvas: Canvas,
        fps: Fps,
    ) -> PoseplayResult<()> {
        if !self.is_idle() {
            tracing::warn!("export already in progress");
            return Err(PoseplayError::illegal_transition(format!(
                "start_export while {:?}",
                self.phase()
            )));
        }
        let source_uri = controller
            .clip()
            .map(|clip| clip.source_uri.clone())
            .ok_or_else(|| PoseplayError::not_ready("start_export before media is ready"))?;

        controller.pause()?;
        controller.seek_time(0.0)?;

        let stream = self.capture.capture_stream(canvas, fps)?;
        let mut recorder = self
            .capture
            .record(stream, self.recorder_cfg, self.events.clone())?;
        recorder.start()?;
        controller.play_once()?;

        tracing::info!(
            source = %source_uri,
            container = ?self.recorder_cfg.container,
            "export recording started"
        );
        self.state = ExportState::Recording(ActiveExport {
            session: RecordingSession::new(source_uri),
            recorder,
        });
        Ok(())
    }

    /// Feed one drawn canvas frame to the recorder. No-op unless recording.
    pub fn push_frame(&mut self, frame: &FrameRGBA) -> PoseplayResult<()> {
        if let ExportState::Recording(active) = &mut self.state {
            active.recorder.push_frame(frame)?;
        }
        Ok(())
    }

    /// Append a recorder chunk to the active session.
    pub fn on_chunk(&mut self, bytes: Vec<u8>) {
        match &mut self.state {
            ExportState::Recording(active) | ExportState::Finalizing(active) => {
                if !bytes.is_empty() {
                    active.session.captured_chunks.push(bytes);
                }
            }
            ExportState::Idle => {
                tracing::warn!(bytes = bytes.len(), "recorder chunk arrived while idle; dropped");
            }
        }
    }

    /// The clip reached its natural end: flush and stop the recorder.
    pub fn on_media_ended(&mut self) -> PoseplayResult<()> {
        if matches!(self.state, ExportState::Recording(_)) {
            self.halt_capture()?;
        }
        Ok(())
    }

    /// Stop an export before the clip ends. Captured chunks are kept and delivered.
    #[tracing::instrument(skip(self, controller), fields(phase = ?self.phase()))]
    pub fn stop_recording(&mut self, controller: &mut PlaybackController) -> PoseplayResult<()> {
        if !matches!(self.state, ExportState::Recording(_)) {
            tracing::warn!("stop_recording without an active recording");
            return Err(PoseplayError::illegal_transition(format!(
                "stop_recording while {:?}",
                self.phase()
            )));
        }
        if controller.is_playing() {
            controller.pause()?;
        }
        self.halt_capture()
    }

    fn halt_capture(&mut self) -> PoseplayResult<()> {
        let ExportState::Recording(mut active) = std::mem::take(&mut self.state) else {
            return Ok(());
        };
        let halted = active
            .recorder
            .request_data()
            .and_then(|()| active.recorder.stop());
        tracing::info!(
            chunks = active.session.captured_chunks.len(),
            "export recording stopped; finalizing"
        );
        self.state = ExportState::Finalizing(active);
        halted
    }

    /// Route a recorder notification. Returns the report once an export completes.
    pub fn on_recorder_event(
        &mut self,
        event: RecorderEvent,
    ) -> PoseplayResult<Option<ExportReport>> {
        match event {
            RecorderEvent::Chunk(bytes) => {
                self.on_chunk(bytes);
                Ok(None)
            }
            RecorderEvent::Stopped => self.on_recorder_stopped(),
        }
    }

    /// Stop acknowledgment: assemble the chunks, deliver the download and return to idle.
    #[tracing::instrument(skip(self), fields(phase = ?self.phase()))]
    pub fn on_recorder_stopped(&mut self) -> PoseplayResult<Option<ExportReport>> {
        let active = match std::mem::take(&mut self.state) {
            ExportState::Finalizing(active) => active,
            ExportState::Recording(active) => {
                tracing::warn!("recorder stopped before a stop was requested");
                active
            }
            ExportState::Idle => {
                tracing::warn!("recorder stop acknowledgment while idle; ignored");
                return Ok(None);
            }
        };

        let ActiveExport { session, recorder } = active;
        recorder.finish()?;

        let bytes = session.assemble();
        let filename = export_filename(
            &session.output_filename_base,
            &self.output_suffix,
            self.recorder_cfg.container.extension(),
        );
        let path = self.downloads.deliver(&filename, &bytes)?;
        let report = ExportReport {
            filename,
            path,
            bytes: bytes.len(),
            chunks: session.captured_chunks.len(),
        };
        tracing::info!(
            filename = %report.filename,
            bytes = report.bytes,
            chunks = report.chunks,
            "export delivered"
        );
        Ok(Some(report))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
