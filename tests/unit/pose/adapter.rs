use super::*;
use crate::pose::model::{Keypoint, PoseResult};

fn body(tag: f64, keypoints: usize) -> PoseResult {
    PoseResult {
        keypoints: (0..keypoints)
            .map(|i| Keypoint::new("nose", tag, i as f64, 0.9))
            .collect(),
        skeleton: Vec::new(),
    }
}

#[test]
fn latest_is_empty_before_first_arrival() {
    let a = PoseStreamAdapter::new();
    assert!(a.latest().is_empty());
}

#[test]
fn arrival_replaces_wholesale() {
    let a = PoseStreamAdapter::new();
    a.on_result(vec![body(1.0, 3), body(1.0, 3)].into());
    a.on_result(vec![body(2.0, 5)].into());

    let latest = a.latest();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest.as_slice()[0].keypoints.len(), 5);
    assert_eq!(latest.as_slice()[0].keypoints[0].x, 2.0);
}

#[test]
fn clones_share_the_slot() {
    let a = PoseStreamAdapter::new();
    let writer = a.clone();
    writer.on_result(vec![body(7.0, 1)].into());
    assert_eq!(a.latest().len(), 1);
    a.on_result(PoseResultSet::empty());
    assert!(writer.latest().is_empty());
}

#[test]
fn concurrent_reader_never_observes_a_torn_set() {
    let a = PoseStreamAdapter::new();
    let writer = a.clone();

    let handle = std::thread::spawn(move || {
        for round in 0..500u32 {
            let n = (round % 4) as usize + 1;
            let tag = f64::from(round);
            writer.on_result((0..n).map(|_| body(tag, n)).collect());
        }
    });

    for _ in 0..2000 {
        let set = a.latest();
        if let Some(first) = set.iter().next() {
            let tag = first.keypoints[0].x;
            let n = set.len();
            for pose in &set {
                assert_eq!(pose.keypoints.len(), n);
                assert!(pose.keypoints.iter().all(|k| k.x == tag));
            }
        }
    }
    handle.join().unwrap();
}
