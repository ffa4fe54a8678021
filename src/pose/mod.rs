//! Pose results, the latest-result adapter and estimator collaborators.

/// Latest-result holder.
pub mod adapter;
/// Estimator contract and worker thread.
pub mod estimator;
/// Keypoints, bodies and result sets.
pub mod model;
/// PoseNet skeleton derivation.
pub mod skeleton;
/// Recorded pose tracks.
pub mod track;
