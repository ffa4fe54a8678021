use crate::config::RecorderConfig;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::PoseplayResult;
use crate::render::frame::FrameRGBA;
use crate::session::inbox::InboxSender;

/// Live capture of the canvas pixel output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasStream {
    /// Captured canvas size.
    pub canvas: Canvas,
    /// Rate frames are pushed at.
    pub fps: Fps,
}

/// Notifications a recorder posts to the inbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecorderEvent {
    /// One encoded segment. Segments concatenated in arrival order form the output file.
    Chunk(Vec<u8>),
    /// The recorder acknowledged a stop; no further chunks follow.
    Stopped,
}

/// Capture/record collaborator.
///
/// Hosts that cannot capture the canvas or encode the stream fail with
/// [`crate::PoseplayError::CaptureUnavailable`].
pub trait CaptureHost {
    /// Open a capture of the canvas output.
    fn capture_stream(&mut self, canvas: Canvas, fps: Fps) -> PoseplayResult<CanvasStream>;

    /// Create a recorder for `stream` that posts its events to `events`.
    fn record(
        &mut self,
        stream: CanvasStream,
        cfg: RecorderConfig,
        events: InboxSender,
    ) -> PoseplayResult<Box<dyn CanvasRecorder>>;
}

/// A recorder consuming canvas frames and emitting encoded chunks asynchronously.
///
/// Contract: `start` once, then any number of `push_frame`/`request_data` calls, then `stop`.
/// After `stop` the recorder delivers any remaining chunks followed by exactly one
/// [`RecorderEvent::Stopped`]; `finish` is called after that acknowledgment has been handled.
pub trait CanvasRecorder: Send {
    /// Begin recording.
    fn start(&mut self) -> PoseplayResult<()>;
    /// Feed one captured canvas frame.
    fn push_frame(&mut self, frame: &FrameRGBA) -> PoseplayResult<()>;
    /// Ask for buffered-but-undelivered data to be emitted as a chunk.
    fn request_data(&mut self) -> PoseplayResult<()>;
    /// Stop capturing. The stop acknowledgment arrives later through the inbox.
    fn stop(&mut self) -> PoseplayResult<()>;
    /// Release recorder resources and report a failed encode.
    fn finish(self: Box<Self>) -> PoseplayResult<()> {
        Ok(())
    }
}
