use std::sync::{Arc, Mutex};

use crate::capture::recorder::{CanvasRecorder, CanvasStream, CaptureHost, RecorderEvent};
use crate::config::RecorderConfig;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::render::frame::FrameRGBA;
use crate::session::inbox::InboxSender;

/// Magic bytes opening every in-memory recording.
pub const MEMORY_RECORDING_MAGIC: &[u8; 4] = b"PPRC";

/// In-process capture host for tests and dry runs.
///
/// Each captured frame is encoded as its 4-byte little-endian sequence number followed by the
/// canvas centre pixel. Frames are sliced into chunks every `timeslice_frames` frames, on
/// `request_data`, and on `stop`.
#[derive(Clone, Debug)]
pub struct MemoryCaptureHost {
    available: bool,
    acknowledge_stop: bool,
    emitted: Arc<Mutex<Vec<Vec<u8>>>>,
    frames: Arc<Mutex<u64>>,
}

impl Default for MemoryCaptureHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCaptureHost {
    /// A working host.
    pub fn new() -> Self {
        Self {
            available: true,
            acknowledge_stop: true,
            emitted: Arc::default(),
            frames: Arc::default(),
        }
    }

    /// A host lacking capture support; every capture fails with `CaptureUnavailable`.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// A host whose recorders never acknowledge `stop`.
    pub fn without_stop_ack() -> Self {
        Self {
            acknowledge_stop: false,
            ..Self::new()
        }
    }

    /// Every chunk emitted so far, in emission order.
    pub fn emitted_chunks(&self) -> Vec<Vec<u8>> {
        lock(&self.emitted).clone()
    }

    /// Total frames captured across recordings.
    pub fn captured_frames(&self) -> u64 {
        *lock(&self.frames)
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CaptureHost for MemoryCaptureHost {
    fn capture_stream(&mut self, canvas: Canvas, fps: Fps) -> PoseplayResult<CanvasStream> {
        if !self.available {
            return Err(PoseplayError::capture_unavailable(
                "in-memory host configured without canvas capture",
            ));
        }
        Ok(CanvasStream { canvas, fps })
    }

    fn record(
        &mut self,
        stream: CanvasStream,
        cfg: RecorderConfig,
        events: InboxSender,
    ) -> PoseplayResult<Box<dyn CanvasRecorder>> {
        if !self.available {
            return Err(PoseplayError::capture_unavailable(
                "in-memory host configured without recording",
            ));
        }
        Ok(Box::new(MemoryRecorder {
            stream,
            timeslice_frames: u64::from(cfg.timeslice_frames),
            acknowledge_stop: self.acknowledge_stop,
            events,
            emitted: self.emitted.clone(),
            frames: self.frames.clone(),
            pending: Vec::new(),
            pending_frames: 0,
            seq: 0,
            phase: Phase::Created,
        }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Created,
    Recording,
    Stopped,
}

struct MemoryRecorder {
    stream: CanvasStream,
    timeslice_frames: u64,
    acknowledge_stop: bool,
    events: InboxSender,
    emitted: Arc<Mutex<Vec<Vec<u8>>>>,
    frames: Arc<Mutex<u64>>,
    pending: Vec<u8>,
    pending_frames: u64,
    seq: u32,
    phase: Phase,
}

impl MemoryRecorder {
    fn emit_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let chunk = std::mem::take(&mut self.pending);
        self.pending_frames = 0;
        lock(&self.emitted).push(chunk.clone());
        self.events.post(RecorderEvent::Chunk(chunk));
    }
}

impl CanvasRecorder for MemoryRecorder {
    fn start(&mut self) -> PoseplayResult<()> {
        if self.phase != Phase::Created {
            return Err(PoseplayError::illegal_transition("recorder already started"));
        }
        self.phase = Phase::Recording;
        self.pending.extend_from_slice(MEMORY_RECORDING_MAGIC);
        self.pending
            .extend_from_slice(&self.stream.canvas.width.to_le_bytes());
        self.pending
            .extend_from_slice(&self.stream.canvas.height.to_le_bytes());
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> PoseplayResult<()> {
        if self.phase != Phase::Recording {
            return Err(PoseplayError::illegal_transition(
                "recorder is not accepting frames",
            ));
        }
        let canvas = self.stream.canvas;
        if frame.width != canvas.width || frame.height != canvas.height {
            return Err(PoseplayError::validation("frame size mismatch"));
        }

        let centre = frame
            .pixel(canvas.width / 2, canvas.height / 2)
            .unwrap_or([0, 0, 0, 0]);
        self.pending.extend_from_slice(&self.seq.to_le_bytes());
        self.pending.extend_from_slice(&centre);
        self.seq += 1;
        self.pending_frames += 1;
        *lock(&self.frames) += 1;

        if self.pending_frames >= self.timeslice_frames {
            self.emit_pending();
        }
        Ok(())
    }

    fn request_data(&mut self) -> PoseplayResult<()> {
        self.emit_pending();
        Ok(())
    }

    fn stop(&mut self) -> PoseplayResult<()> {
        if self.phase != Phase::Recording {
            return Err(PoseplayError::illegal_transition("recorder is not recording"));
        }
        self.phase = Phase::Stopped;
        self.emit_pending();
        if self.acknowledge_stop {
            self.events.post(RecorderEvent::Stopped);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/memory.rs"]
mod tests;
