use std::sync::Arc;

use crate::foundation::core::Point;

/// A detected anatomical landmark.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keypoint {
    /// Horizontal position in canvas pixels.
    pub x: f64,
    /// Vertical position in canvas pixels.
    pub y: f64,
    /// Detection confidence in `[0, 1]`.
    pub score: f32,
    /// Body-part label, e.g. `leftShoulder`.
    pub part: String,
}

impl Keypoint {
    /// Build a keypoint.
    pub fn new(part: impl Into<String>, x: f64, y: f64, score: f32) -> Self {
        Self {
            x,
            y,
            score,
            part: part.into(),
        }
    }

    /// Position as a point.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One detected body.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoseResult {
    /// Keypoints in model order.
    pub keypoints: Vec<Keypoint>,
    /// Connected keypoint pairs in draw order.
    pub skeleton: Vec<(Keypoint, Keypoint)>,
}

impl PoseResult {
    /// Mean keypoint score; `0.0` for a body without keypoints.
    pub fn score(&self) -> f32 {
        if self.keypoints.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.keypoints.iter().map(|k| k.score).sum();
        sum / self.keypoints.len() as f32
    }
}

/// The bodies detected in one frame, in the order the estimator reported them.
///
/// Cloning is cheap: the bodies are shared, and a set is always replaced as a whole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseResultSet {
    poses: Arc<[PoseResult]>,
}

impl PoseResultSet {
    /// The empty set reported before any estimate arrives.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of bodies.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// `true` when no body was detected.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Bodies in result order.
    pub fn iter(&self) -> std::slice::Iter<'_, PoseResult> {
        self.poses.iter()
    }

    /// Bodies as a slice.
    pub fn as_slice(&self) -> &[PoseResult] {
        &self.poses
    }
}

impl From<Vec<PoseResult>> for PoseResultSet {
    fn from(poses: Vec<PoseResult>) -> Self {
        Self {
            poses: poses.into(),
        }
    }
}

impl FromIterator<PoseResult> for PoseResultSet {
    fn from_iter<I: IntoIterator<Item = PoseResult>>(iter: I) -> Self {
        Self {
            poses: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PoseResultSet {
    type Item = &'a PoseResult;
    type IntoIter = std::slice::Iter<'a, PoseResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
