use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::JoinHandle;

use crate::config::EstimatorConfig;
use crate::foundation::error::PoseplayResult;
use crate::media::source::VideoFrame;
use crate::pose::model::PoseResultSet;
use crate::session::inbox::InboxSender;

/// Pose-estimation collaborator: a black box that turns a frame into detected bodies.
pub trait PoseEstimator: Send {
    /// Estimate the bodies visible in `frame`.
    fn estimate(&mut self, frame: &VideoFrame, cfg: &EstimatorConfig)
    -> PoseplayResult<PoseResultSet>;
}

/// Runs an estimator on its own thread and posts each result set to the inbox.
///
/// Frames are offered through a single-slot channel: while inference is busy newer frames are
/// dropped, so results track "the most recent frame the model could take", never a backlog.
pub struct EstimatorWorker {
    frames: Option<SyncSender<VideoFrame>>,
    handle: Option<JoinHandle<()>>,
}

impl EstimatorWorker {
    /// Start the worker thread.
    pub fn spawn(
        mut estimator: Box<dyn PoseEstimator>,
        cfg: EstimatorConfig,
        events: InboxSender,
    ) -> PoseplayResult<Self> {
        let (tx, rx) = mpsc::sync_channel::<VideoFrame>(1);
        let handle = std::thread::Builder::new()
            .name("poseplay-estimator".to_owned())
            .spawn(move || {
                for frame in rx {
                    match estimator.estimate(&frame, &cfg) {
                        Ok(set) => events.post(set),
                        Err(e) => {
                            tracing::warn!(t = frame.time_secs, error = %e, "pose estimate failed");
                        }
                    }
                }
                tracing::debug!("estimator worker exiting");
            })
            .map_err(|e| anyhow::anyhow!("failed to spawn estimator thread: {e}"))?;

        Ok(Self {
            frames: Some(tx),
            handle: Some(handle),
        })
    }

    /// Offer a frame for inference. Returns `false` when the worker is busy and the frame was dropped.
    pub fn submit(&self, frame: VideoFrame) -> bool {
        let Some(tx) = self.frames.as_ref() else {
            return false;
        };
        match tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!("estimator worker is gone; frame dropped");
                false
            }
        }
    }
}

impl Drop for EstimatorWorker {
    fn drop(&mut self) {
        drop(self.frames.take());
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("estimator worker panicked");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/estimator.rs"]
mod tests;
