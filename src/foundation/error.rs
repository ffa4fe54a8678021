/// Crate-wide result alias.
pub type PoseplayResult<T> = Result<T, PoseplayError>;

/// Errors surfaced by the playback, overlay and export pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PoseplayError {
    /// An operation was issued before the clip metadata was loaded.
    #[error("not ready: {0}")]
    NotReady(String),

    /// An operation is not legal in the current pipeline state.
    #[error("illegal state transition: {0}")]
    IllegalStateTransition(String),

    /// The host cannot capture the canvas or record the captured stream.
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// Invalid configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// A media collaborator (probe, decode, encode) failed.
    #[error("media error: {0}")]
    Media(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PoseplayError {
    /// Build a [`PoseplayError::NotReady`].
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Build a [`PoseplayError::IllegalStateTransition`].
    pub fn illegal_transition(msg: impl Into<String>) -> Self {
        Self::IllegalStateTransition(msg.into())
    }

    /// Build a [`PoseplayError::CaptureUnavailable`].
    pub fn capture_unavailable(msg: impl Into<String>) -> Self {
        Self::CaptureUnavailable(msg.into())
    }

    /// Build a [`PoseplayError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PoseplayError::Media`].
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Rejections the render loop recovers from locally by ignoring the call.
    pub fn is_recoverable_rejection(&self) -> bool {
        matches!(self, Self::NotReady(_) | Self::IllegalStateTransition(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
