use std::path::Path;

use anyhow::Context as _;

use crate::config::EstimatorConfig;
use crate::foundation::error::{PoseplayError, PoseplayResult};
use crate::media::source::VideoFrame;
use crate::pose::estimator::PoseEstimator;
use crate::pose::model::{Keypoint, PoseResult, PoseResultSet};
use crate::pose::skeleton::adjacent_keypoints;

#[derive(serde::Deserialize)]
struct TrackEntryDef {
    time: f64,
    #[serde(default)]
    poses: Vec<PoseDef>,
}

#[derive(serde::Deserialize)]
struct PoseDef {
    pose: BodyDef,
    #[serde(default)]
    skeleton: Vec<[KeypointDef; 2]>,
}

#[derive(serde::Deserialize)]
struct BodyDef {
    keypoints: Vec<KeypointDef>,
}

#[derive(Clone, serde::Deserialize)]
struct KeypointDef {
    score: f32,
    part: String,
    position: PositionDef,
}

#[derive(Clone, serde::Deserialize)]
struct PositionDef {
    x: f64,
    y: f64,
}

impl From<KeypointDef> for Keypoint {
    fn from(k: KeypointDef) -> Self {
        Keypoint::new(k.part, k.position.x, k.position.y, k.score)
    }
}

/// Pose results recorded offline, replayed as an estimator.
///
/// The file is a JSON array of `{ "time": secs, "poses": [...] }` entries where each pose has the
/// PoseNet result shape (`pose.keypoints[]` with `part`, `score`, `position.{x,y}`, and an optional
/// `skeleton` of keypoint pairs). Coordinates are canvas pixels, so `scale_factor` has no effect
/// on a recorded track.
#[derive(Clone, Debug, Default)]
pub struct PoseTrack {
    entries: Vec<(f64, PoseResultSet)>,
}

impl PoseTrack {
    /// Parse a track from JSON bytes.
    ///
    /// Poses without an explicit skeleton get one derived from PoseNet's connected parts, using
    /// `edge_min_confidence` as the per-end score floor.
    pub fn from_json_slice(bytes: &[u8], edge_min_confidence: f32) -> PoseplayResult<Self> {
        let defs: Vec<TrackEntryDef> = serde_json::from_slice(bytes)
            .map_err(|e| PoseplayError::validation(format!("invalid pose track JSON: {e}")))?;

        let mut entries = Vec::with_capacity(defs.len());
        for def in defs {
            if !def.time.is_finite() || def.time < 0.0 {
                return Err(PoseplayError::validation(format!(
                    "pose track entry has invalid time {}",
                    def.time
                )));
            }
            let set: PoseResultSet = def
                .poses
                .into_iter()
                .map(|p| {
                    let keypoints: Vec<Keypoint> =
                        p.pose.keypoints.into_iter().map(Keypoint::from).collect();
                    let skeleton = if p.skeleton.is_empty() {
                        adjacent_keypoints(&keypoints, edge_min_confidence)
                    } else {
                        p.skeleton
                            .into_iter()
                            .map(|[a, b]| (a.into(), b.into()))
                            .collect()
                    };
                    PoseResult {
                        keypoints,
                        skeleton,
                    }
                })
                .collect();
            entries.push((def.time, set));
        }
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Self { entries })
    }

    /// Load a track file.
    pub fn from_json_file(path: &Path, edge_min_confidence: f32) -> PoseplayResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read pose track '{}'", path.display()))?;
        Self::from_json_slice(&bytes, edge_min_confidence)
    }

    /// Number of timed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the track has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The latest entry at or before `time_secs`; empty before the first entry.
    pub fn at(&self, time_secs: f64) -> PoseResultSet {
        let idx = self.entries.partition_point(|(t, _)| *t <= time_secs);
        match idx {
            0 => PoseResultSet::empty(),
            n => self.entries[n - 1].1.clone(),
        }
    }
}

/// Replays a [`PoseTrack`] against the frame clock.
#[derive(Clone, Debug)]
pub struct TrackEstimator {
    track: PoseTrack,
}

impl TrackEstimator {
    /// Wrap a loaded track.
    pub fn new(track: PoseTrack) -> Self {
        Self { track }
    }
}

impl PoseEstimator for TrackEstimator {
    fn estimate(
        &mut self,
        frame: &VideoFrame,
        cfg: &EstimatorConfig,
    ) -> PoseplayResult<PoseResultSet> {
        let set = self.track.at(frame.time_secs);
        if set.iter().all(|p| p.score() >= cfg.min_confidence) {
            return Ok(set);
        }
        Ok(set
            .iter()
            .filter(|p| p.score() >= cfg.min_confidence)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/track.rs"]
mod tests;
