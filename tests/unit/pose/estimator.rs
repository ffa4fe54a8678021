use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::foundation::error::PoseplayError;
use crate::pose::model::{Keypoint, PoseResult};
use crate::render::frame::FrameRGBA;
use crate::session::inbox::{AppEvent, Inbox};

struct EchoTime;

impl PoseEstimator for EchoTime {
    fn estimate(
        &mut self,
        frame: &VideoFrame,
        _cfg: &EstimatorConfig,
    ) -> PoseplayResult<PoseResultSet> {
        if frame.time_secs < 0.0 {
            return Err(PoseplayError::media("negative time"));
        }
        Ok(vec![PoseResult {
            keypoints: vec![Keypoint::new("nose", frame.time_secs, 0.0, 1.0)],
            skeleton: Vec::new(),
        }]
        .into())
    }
}

fn frame(t: f64) -> VideoFrame {
    VideoFrame {
        time_secs: t,
        image: Arc::new(FrameRGBA::solid(2, 2, [0, 0, 0, 255])),
    }
}

#[test]
fn results_are_posted_to_the_inbox() {
    let inbox = Inbox::new();
    let worker =
        EstimatorWorker::spawn(Box::new(EchoTime), EstimatorConfig::default(), inbox.sender())
            .unwrap();

    assert!(worker.submit(frame(1.25)));
    let event = inbox.wait(Duration::from_secs(5)).expect("pose result");
    let AppEvent::Pose(set) = event else {
        panic!("expected pose event, got {event:?}");
    };
    assert_eq!(set.as_slice()[0].keypoints[0].x, 1.25);
}

#[test]
fn failed_estimates_post_nothing() {
    let inbox = Inbox::new();
    let worker =
        EstimatorWorker::spawn(Box::new(EchoTime), EstimatorConfig::default(), inbox.sender())
            .unwrap();
    worker.submit(frame(-1.0));
    drop(worker);
    assert!(inbox.drain().is_empty());
}

#[test]
fn drop_joins_the_worker() {
    let inbox = Inbox::new();
    let worker =
        EstimatorWorker::spawn(Box::new(EchoTime), EstimatorConfig::default(), inbox.sender())
            .unwrap();
    let accepted = worker.submit(frame(0.5));
    drop(worker);
    // Whatever was accepted before the drop has been processed by the time it returns.
    assert_eq!(inbox.drain().len(), usize::from(accepted));
}
