/// Clip metadata reported by the media collaborator once the source is ready.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipMetadata {
    /// URI of the alternate that was selected for playback.
    pub source_uri: String,
    /// Decoded frame width in pixels.
    pub width: u32,
    /// Decoded frame height in pixels.
    pub height: u32,
    /// Clip duration in seconds.
    pub duration_secs: f64,
}

/// Transport state of a ready clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    /// Clock halted at the current position.
    Paused,
    /// Clock running. `looping` wraps at the end instead of stopping there.
    Playing {
        /// Wrap to the start at the end of the clip.
        looping: bool,
    },
}

/// Playback state of a loaded clip.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipState {
    /// URI of the clip being played.
    pub source_uri: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Total duration in seconds, always > 0.
    pub duration_secs: f64,
    /// Playhead position in seconds within `[0, duration_secs]`.
    pub current_time_secs: f64,
    /// Current transport.
    pub transport: Transport,
}

impl ClipState {
    pub(crate) fn from_metadata(meta: ClipMetadata) -> Self {
        Self {
            source_uri: meta.source_uri,
            width: meta.width,
            height: meta.height,
            duration_secs: meta.duration_secs,
            current_time_secs: 0.0,
            transport: Transport::Paused,
        }
    }

    /// Whether the media clock is running.
    pub fn is_playing(&self) -> bool {
        matches!(self.transport, Transport::Playing { .. })
    }

    /// Elapsed fraction of the clip in `[0, 1]`.
    pub fn completion_fraction(&self) -> f64 {
        self.current_time_secs / self.duration_secs
    }
}
