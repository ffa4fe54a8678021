use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::media::source::{VideoFrame, VideoSource};
use crate::playback::clip::ClipMetadata;
use crate::render::frame::FrameRGBA;

/// Frames decoded per `ffmpeg` invocation on a cache miss.
const DECODE_BATCH: u32 = 24;

/// Return `true` when `tool -version` runs successfully from `PATH`.
pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Probe a clip's video stream through `ffprobe`.
pub fn probe_clip(source_path: &Path) -> PoseplayResult<ClipMetadata> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| PoseplayError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(PoseplayError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| PoseplayError::media(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| PoseplayError::media("no video stream found"))?;
    let width = video
        .width
        .ok_or_else(|| PoseplayError::media("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| PoseplayError::media("missing video height from ffprobe"))?;
    let duration_secs = parsed
        .format
        .and_then(|f| f.duration)
        .or_else(|| video.duration.clone())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| PoseplayError::media("missing duration from ffprobe"))?;

    Ok(ClipMetadata {
        source_uri: source_path.display().to_string(),
        width,
        height,
        duration_secs,
    })
}

/// LRU cache of decoded frames keyed by sample slot.
#[derive(Debug)]
struct FrameCache {
    frames: HashMap<u64, Arc<FrameRGBA>>,
    lru: VecDeque<u64>,
    capacity: usize,
}

impl FrameCache {
    fn new(capacity: usize) -> Self {
        Self {
            frames: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&mut self, slot: u64) -> Option<Arc<FrameRGBA>> {
        let frame = self.frames.get(&slot).cloned()?;
        self.touch(slot);
        Some(frame)
    }

    fn insert(&mut self, slot: u64, frame: Arc<FrameRGBA>) {
        self.frames.insert(slot, frame);
        self.touch(slot);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.frames.remove(&old);
            }
        }
    }

    fn touch(&mut self, slot: u64) {
        if let Some(pos) = self.lru.iter().position(|s| *s == slot) {
            self.lru.remove(pos);
        }
        self.lru.push_back(slot);
    }

    /// Cache a batch decoded from `start` and return the frame served for `requested`.
    ///
    /// When the batch starts before `requested` (end-of-clip fallback), its first frame is also
    /// cached under `requested` so later lookups hit.
    fn store_batch(
        &mut self,
        requested: u64,
        start: u64,
        batch: Vec<Arc<FrameRGBA>>,
    ) -> Option<Arc<FrameRGBA>> {
        let first = batch.first().cloned()?;
        for (i, frame) in batch.into_iter().enumerate() {
            self.insert(start + i as u64, frame);
        }
        if start != requested {
            self.insert(requested, first.clone());
        }
        Some(first)
    }
}

/// Video source that decodes through the system `ffmpeg`, scaled to the canvas, audio dropped.
///
/// Frames are sampled on a fixed grid (`sample_fps`) and cached; a miss decodes a short batch of
/// sequential frames, since playback mostly moves forward.
pub struct FfmpegVideoSource {
    path: PathBuf,
    meta: ClipMetadata,
    canvas: Canvas,
    sample_fps: Fps,
    cache: FrameCache,
}

impl FfmpegVideoSource {
    /// Open the first alternate that `ffprobe` accepts.
    ///
    /// `canvas` is the decode size; `sample_fps` is the time grid frames are cached on.
    pub fn open(
        candidates: &[String],
        canvas: Canvas,
        sample_fps: Fps,
        capacity: usize,
    ) -> PoseplayResult<Self> {
        if candidates.is_empty() {
            return Err(PoseplayError::validation("at least one clip URI is required"));
        }
        if !is_tool_on_path("ffprobe") || !is_tool_on_path("ffmpeg") {
            return Err(PoseplayError::media(
                "ffmpeg and ffprobe are required for clip decoding, but were not found on PATH",
            ));
        }

        let mut failures = Vec::new();
        for uri in candidates {
            let path = PathBuf::from(uri);
            match probe_clip(&path) {
                Ok(mut meta) => {
                    meta.source_uri = uri.clone();
                    tracing::info!(uri = %uri, "selected clip alternate");
                    return Ok(Self {
                        path,
                        meta,
                        canvas,
                        sample_fps,
                        cache: FrameCache::new(capacity),
                    });
                }
                Err(e) => {
                    tracing::warn!(uri = %uri, error = %e, "clip alternate not playable");
                    failures.push(format!("{uri}: {e}"));
                }
            }
        }
        Err(PoseplayError::media(format!(
            "no playable clip alternate: {}",
            failures.join("; ")
        )))
    }

    fn decode_batch(&self, start_slot: u64, count: u32) -> PoseplayResult<Vec<Vec<u8>>> {
        let start_secs = self.sample_fps.frames_to_secs(start_slot);
        let filter = format!(
            "fps={}/{},scale={}:{}",
            self.sample_fps.num, self.sample_fps.den, self.canvas.width, self.canvas.height
        );
        let out = Command::new("ffmpeg")
            .args(["-v", "error", "-ss", &format!("{start_secs:.6}")])
            .arg("-i")
            .arg(&self.path)
            .args([
                "-an",
                "-vf",
                &filter,
                "-frames:v",
                &count.to_string(),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .output()
            .map_err(|e| {
                PoseplayError::media(format!("failed to run ffmpeg for video decode: {e}"))
            })?;

        if !out.status.success() {
            return Err(PoseplayError::media(format!(
                "ffmpeg video decode failed for '{}': {}",
                self.path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let frame_len = self.canvas.byte_len();
        if frame_len == 0 || !out.stdout.len().is_multiple_of(frame_len) {
            return Err(PoseplayError::media(format!(
                "decoded video batch has invalid size: got {} bytes, expected multiples of {frame_len}",
                out.stdout.len()
            )));
        }
        Ok(out
            .stdout
            .chunks_exact(frame_len)
            .map(<[u8]>::to_vec)
            .collect())
    }

}

impl VideoSource for FfmpegVideoSource {
    fn metadata(&self) -> &ClipMetadata {
        &self.meta
    }

    fn frame_at(&mut self, time_secs: f64) -> PoseplayResult<VideoFrame> {
        let slot = self.sample_fps.secs_to_frames_round(time_secs);
        if let Some(image) = self.cache.get(slot) {
            return Ok(VideoFrame { time_secs, image });
        }

        // The end of the clip has no frame at exactly `duration`; fall back one slot.
        for start in [slot, slot.saturating_sub(1)] {
            let batch = self.decode_batch(start, DECODE_BATCH)?;
            if batch.is_empty() {
                continue;
            }
            let (w, h) = (self.canvas.width, self.canvas.height);
            let frames = batch
                .into_iter()
                .map(|data| FrameRGBA::new(w, h, data, false).map(Arc::new))
                .collect::<PoseplayResult<Vec<_>>>()?;
            if let Some(image) = self.cache.store_batch(slot, start, frames) {
                return Ok(VideoFrame { time_secs, image });
            }
        }

        Err(PoseplayError::media(format!(
            "ffmpeg returned no video frames at {time_secs:.3}s for '{}'",
            self.path.display()
        )))
    }
}
