use crate::foundation::core::Fps;
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::playback::clip::{ClipMetadata, ClipState, Transport};

/// Direction of a single frame step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepDirection {
    /// One nominal frame later.
    Forward,
    /// One nominal frame earlier.
    Backward,
}

/// Media clock lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub enum ClockState {
    /// Metadata not loaded yet; every transport operation is rejected.
    Unready,
    /// Clip loaded and operational.
    Ready(ClipState),
}

/// Signals raised while the clock advances during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSignal {
    /// Non-looping playback reached the end of the clip.
    Ended,
}

/// Owns the media clock and exposes transport operations.
///
/// Stepping uses a fixed nominal frame rate rather than the container's real rate, so a step is
/// an approximation of "one frame", not an exact seek to the next decoded frame.
#[derive(Clone, Debug)]
pub struct PlaybackController {
    state: ClockState,
    step_fps: Fps,
}

impl PlaybackController {
    /// Create an unready controller stepping at `step_fps`.
    pub fn new(step_fps: Fps) -> Self {
        Self {
            state: ClockState::Unready,
            step_fps,
        }
    }

    /// Apply the media collaborator's ready signal.
    pub fn on_ready(&mut self, meta: ClipMetadata) -> PoseplayResult<()> {
        if !meta.duration_secs.is_finite() || meta.duration_secs <= 0.0 {
            return Err(PoseplayError::media(format!(
                "clip '{}' reported invalid duration {}",
                meta.source_uri, meta.duration_secs
            )));
        }
        if meta.width == 0 || meta.height == 0 {
            return Err(PoseplayError::media(format!(
                "clip '{}' reported zero-sized frames",
                meta.source_uri
            )));
        }
        tracing::info!(
            uri = %meta.source_uri,
            duration_secs = meta.duration_secs,
            width = meta.width,
            height = meta.height,
            "clip ready"
        );
        self.state = ClockState::Ready(ClipState::from_metadata(meta));
        Ok(())
    }

    /// Lifecycle state.
    pub fn state(&self) -> &ClockState {
        &self.state
    }

    /// Clip state when ready.
    pub fn clip(&self) -> Option<&ClipState> {
        match &self.state {
            ClockState::Ready(clip) => Some(clip),
            ClockState::Unready => None,
        }
    }

    /// Whether metadata has been loaded.
    pub fn is_ready(&self) -> bool {
        self.clip().is_some()
    }

    /// Whether the clock is running. `false` while unready.
    pub fn is_playing(&self) -> bool {
        self.clip().is_some_and(ClipState::is_playing)
    }

    /// Text for the play/pause control: the action the control performs next.
    pub fn transport_label(&self) -> &'static str {
        if self.is_playing() { "pause" } else { "play" }
    }

    /// Nominal frame rate used for stepping.
    pub fn step_fps(&self) -> Fps {
        self.step_fps
    }

    fn clip_mut(&mut self, op: &str) -> PoseplayResult<&mut ClipState> {
        match &mut self.state {
            ClockState::Ready(clip) => Ok(clip),
            ClockState::Unready => Err(PoseplayError::not_ready(format!(
                "{op} issued before clip metadata loaded"
            ))),
        }
    }

    /// Resume in continuous-looping mode. Idempotent while playing.
    pub fn play(&mut self) -> PoseplayResult<()> {
        let clip = self.clip_mut("play")?;
        clip.transport = Transport::Playing { looping: true };
        tracing::debug!(t = clip.current_time_secs, "play (looping)");
        Ok(())
    }

    /// Play through to the natural end once, without wrapping.
    pub fn play_once(&mut self) -> PoseplayResult<()> {
        let clip = self.clip_mut("play_once")?;
        clip.transport = Transport::Playing { looping: false };
        tracing::debug!(t = clip.current_time_secs, "play (once)");
        Ok(())
    }

    /// Halt the clock at the current position.
    pub fn pause(&mut self) -> PoseplayResult<()> {
        let clip = self.clip_mut("pause")?;
        clip.transport = Transport::Paused;
        tracing::debug!(t = clip.current_time_secs, "pause");
        Ok(())
    }

    /// Flip between playing and paused; returns the resulting playing flag.
    pub fn toggle_play_pause(&mut self) -> PoseplayResult<bool> {
        if self.clip_mut("toggle_play_pause")?.is_playing() {
            self.pause()?;
            Ok(false)
        } else {
            self.play()?;
            Ok(true)
        }
    }

    /// Pause, then move one nominal frame in `direction`, clamped to the clip.
    pub fn step_frame(&mut self, direction: StepDirection) -> PoseplayResult<f64> {
        let dt = self.step_fps.frame_duration_secs();
        let clip = self.clip_mut("step_frame")?;
        clip.transport = Transport::Paused;
        let delta = match direction {
            StepDirection::Forward => dt,
            StepDirection::Backward => -dt,
        };
        clip.current_time_secs = (clip.current_time_secs + delta).clamp(0.0, clip.duration_secs);
        tracing::debug!(t = clip.current_time_secs, ?direction, "step frame");
        Ok(clip.current_time_secs)
    }

    /// Seek to `fraction` of the duration. Finite fractions are clamped into `[0, 1]`.
    pub fn seek_to(&mut self, fraction: f64) -> PoseplayResult<f64> {
        if !fraction.is_finite() {
            return Err(PoseplayError::validation(format!(
                "seek fraction must be finite, got {fraction}"
            )));
        }
        let clip = self.clip_mut("seek_to")?;
        clip.current_time_secs = fraction.clamp(0.0, 1.0) * clip.duration_secs;
        tracing::debug!(t = clip.current_time_secs, fraction, "seek");
        Ok(clip.current_time_secs)
    }

    /// Seek to an absolute time, clamped to `[0, duration]`.
    pub fn seek_time(&mut self, secs: f64) -> PoseplayResult<f64> {
        if !secs.is_finite() {
            return Err(PoseplayError::validation(format!(
                "seek time must be finite, got {secs}"
            )));
        }
        let clip = self.clip_mut("seek_time")?;
        clip.current_time_secs = secs.clamp(0.0, clip.duration_secs);
        tracing::debug!(t = clip.current_time_secs, "seek");
        Ok(clip.current_time_secs)
    }

    /// `current_time / duration`.
    pub fn completion_fraction(&self) -> PoseplayResult<f64> {
        self.clip()
            .map(ClipState::completion_fraction)
            .ok_or_else(|| PoseplayError::not_ready("completion fraction before duration known"))
    }

    /// Advance the running clock by `dt_secs`. Does nothing while paused or unready.
    pub fn advance(&mut self, dt_secs: f64) -> Option<ClockSignal> {
        let ClockState::Ready(clip) = &mut self.state else {
            return None;
        };
        let Transport::Playing { looping } = clip.transport else {
            return None;
        };

        let next = clip.current_time_secs + dt_secs.max(0.0);
        if next < clip.duration_secs {
            clip.current_time_secs = next;
            return None;
        }

        if looping {
            clip.current_time_secs = next.rem_euclid(clip.duration_secs);
            tracing::trace!(t = clip.current_time_secs, "loop wrap");
            None
        } else {
            clip.current_time_secs = clip.duration_secs;
            clip.transport = Transport::Paused;
            tracing::debug!("reached natural end of clip");
            Some(ClockSignal::Ended)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
