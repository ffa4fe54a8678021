use std::io::{Read, Write as _};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::capture::recorder::{CanvasRecorder, CanvasStream, CaptureHost, RecorderEvent};
use crate::config::{ContainerFormat, RecorderConfig};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::media::ffmpeg::is_tool_on_path;
use crate::render::frame::FrameRGBA;
use crate::session::inbox::InboxSender;

/// Read size for the encoder's stdout; each read becomes one chunk.
const CHUNK_READ_BYTES: usize = 64 * 1024;

/// Capture host backed by the system `ffmpeg`.
///
/// The canvas is "captured" by piping raw frames into `ffmpeg`; the container it writes to stdout
/// is sliced into chunks by a reader thread.
#[derive(Clone, Debug)]
pub struct FfmpegCaptureHost {
    /// Colour used to flatten alpha before encoding (straight RGBA8).
    pub bg_rgba: [u8; 4],
}

impl Default for FfmpegCaptureHost {
    fn default() -> Self {
        Self {
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

impl CaptureHost for FfmpegCaptureHost {
    fn capture_stream(&mut self, canvas: Canvas, fps: Fps) -> PoseplayResult<CanvasStream> {
        if !is_tool_on_path("ffmpeg") {
            return Err(PoseplayError::capture_unavailable(
                "ffmpeg is required for canvas recording, but was not found on PATH",
            ));
        }
        if !canvas.width.is_multiple_of(2) || !canvas.height.is_multiple_of(2) {
            return Err(PoseplayError::validation(
                "recorded canvas width/height must be even (required for yuv420p output)",
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
        Ok(Box::new(FfmpegRecorder {
            stream,
            cfg,
            bg_rgba: self.bg_rgba,
            events,
            child: None,
            stdin: None,
            stdout_pump: None,
            stderr_drain: None,
        }))
    }
}

/// Recorder that streams raw RGBA frames into `ffmpeg` and relays its output as chunks.
pub struct FfmpegRecorder {
    stream: CanvasStream,
    cfg: RecorderConfig,
    bg_rgba: [u8; 4],
    events: InboxSender,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_pump: Option<JoinHandle<()>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl FfmpegRecorder {
    fn command(&self) -> Command {
        let CanvasStream { canvas, fps } = self.stream;
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", canvas.width, canvas.height),
            "-r",
            &format!("{}/{}", fps.num, fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-b:v",
            &self.cfg.bitrate_bps.to_string(),
            "-pix_fmt",
            "yuv420p",
        ]);

        // Both containers must be writable to a non-seekable pipe.
        match self.cfg.container {
            ContainerFormat::Webm => {
                cmd.args([
                    "-c:v",
                    "libvpx",
                    "-deadline",
                    "realtime",
                    "-cpu-used",
                    "8",
                    "-f",
                    "webm",
                ]);
            }
            ContainerFormat::Mp4 => {
                cmd.args([
                    "-c:v",
                    "libx264",
                    "-movflags",
                    "frag_keyframe+empty_moov+default_base_moof",
                    "-f",
                    "mp4",
                ]);
            }
        }
        cmd.arg("pipe:1");
        cmd
    }
}

impl CanvasRecorder for FfmpegRecorder {
    fn start(&mut self) -> PoseplayResult<()> {
        if self.child.is_some() {
            return Err(PoseplayError::illegal_transition("recorder already started"));
        }

        let mut child = self.command().spawn().map_err(|e| {
            PoseplayError::capture_unavailable(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PoseplayError::media("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| PoseplayError::media("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| PoseplayError::media("failed to open ffmpeg stderr (unexpected)"))?;

        let events = self.events.clone();
        let stdout_pump = std::thread::spawn(move || {
            let mut buf = vec![0u8; CHUNK_READ_BYTES];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => events.post(RecorderEvent::Chunk(buf[..n].to_vec())),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "ffmpeg stdout read failed");
                        break;
                    }
                }
            }
            events.post(RecorderEvent::Stopped);
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(container = ?self.cfg.container, "ffmpeg recorder started");
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_pump = Some(stdout_pump);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> PoseplayResult<()> {
        let canvas = self.stream.canvas;
        if frame.width != canvas.width || frame.height != canvas.height {
            return Err(PoseplayError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, canvas.width, canvas.height
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(PoseplayError::illegal_transition(
                "ffmpeg recorder is not accepting frames",
            ));
        };

        let opaque = frame.to_opaque_rgba8(self.bg_rgba);
        stdin.write_all(&opaque).map_err(|e| {
            PoseplayError::media(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn request_data(&mut self) -> PoseplayResult<()> {
        if let Some(stdin) = self.stdin.as_mut() {
            stdin
                .flush()
                .map_err(|e| PoseplayError::media(format!("failed to flush ffmpeg stdin: {e}")))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> PoseplayResult<()> {
        if self.child.is_none() {
            return Err(PoseplayError::illegal_transition("recorder was never started"));
        }
        // Closing stdin lets ffmpeg finalize the container; the pump posts `Stopped` at EOF.
        drop(self.stdin.take());
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> PoseplayResult<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if let Some(pump) = self.stdout_pump.take()
            && pump.join().is_err()
        {
            tracing::warn!("ffmpeg stdout pump panicked");
        }

        let status = child.wait().map_err(|e| {
            PoseplayError::media(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PoseplayError::media("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| PoseplayError::media(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(PoseplayError::media(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
