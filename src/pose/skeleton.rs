use crate::pose::model::Keypoint;

/// Part pairs PoseNet connects when it derives a skeleton from keypoints.
pub const CONNECTED_PARTS: [(&str, &str); 12] = [
    ("leftHip", "leftShoulder"),
    ("leftElbow", "leftShoulder"),
    ("leftElbow", "leftWrist"),
    ("leftHip", "leftKnee"),
    ("leftKnee", "leftAnkle"),
    ("rightHip", "rightShoulder"),
    ("rightElbow", "rightShoulder"),
    ("rightElbow", "rightWrist"),
    ("rightHip", "rightKnee"),
    ("rightKnee", "rightAnkle"),
    ("leftShoulder", "rightShoulder"),
    ("leftHip", "rightHip"),
];

/// Skeleton edges between connected parts where both ends score at least `min_confidence`.
///
/// Edges follow [`CONNECTED_PARTS`] order; parts missing from `keypoints` are skipped.
pub fn adjacent_keypoints(keypoints: &[Keypoint], min_confidence: f32) -> Vec<(Keypoint, Keypoint)> {
    let find = |part: &str| keypoints.iter().find(|k| k.part == part);

    CONNECTED_PARTS
        .iter()
        .filter_map(|(a, b)| {
            let a = find(a)?;
            let b = find(b)?;
            (a.score >= min_confidence && b.score >= min_confidence)
                .then(|| (a.clone(), b.clone()))
        })
        .collect()
}
