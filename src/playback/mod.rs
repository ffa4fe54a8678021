//! Media clock and transport controls.

/// Clip metadata and playback state.
pub mod clip;
/// The playback controller state machine.
pub mod controller;
