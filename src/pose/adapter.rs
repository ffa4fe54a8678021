use std::sync::{Arc, RwLock};

use crate::pose::model::PoseResultSet;

/// Holds the latest pose result set. No history and no interpolation.
///
/// The adapter is a shared handle: clones observe the same slot. A reader gets the whole set that
/// was current at the time of the call, never a mix of two arrivals.
#[derive(Clone, Debug, Default)]
pub struct PoseStreamAdapter {
    latest: Arc<RwLock<PoseResultSet>>,
}

impl PoseStreamAdapter {
    /// Create an adapter holding the empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently received set, or the empty set before the first arrival.
    pub fn latest(&self) -> PoseResultSet {
        match self.latest.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the latest set wholesale.
    pub fn on_result(&self, set: PoseResultSet) {
        tracing::trace!(bodies = set.len(), "pose result");
        match self.latest.write() {
            Ok(mut guard) => *guard = set,
            Err(poisoned) => *poisoned.into_inner() = set,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/adapter.rs"]
mod tests;
