use std::sync::mpsc;
use std::time::Duration;

use crate::capture::recorder::RecorderEvent;
use crate::media::source::MediaEvent;
use crate::pose::model::PoseResultSet;

/// Everything a collaborator can tell the application.
#[derive(Clone, Debug)]
pub enum AppEvent {
    /// Media readiness and end-of-clip.
    Media(MediaEvent),
    /// A pose estimate arrived.
    Pose(PoseResultSet),
    /// Recorder chunk and stop notifications.
    Recorder(RecorderEvent),
}

impl From<MediaEvent> for AppEvent {
    fn from(e: MediaEvent) -> Self {
        Self::Media(e)
    }
}

impl From<PoseResultSet> for AppEvent {
    fn from(set: PoseResultSet) -> Self {
        Self::Pose(set)
    }
}

impl From<RecorderEvent> for AppEvent {
    fn from(e: RecorderEvent) -> Self {
        Self::Recorder(e)
    }
}

/// Producer side of the inbox. Cheap to clone and safe to move to collaborator threads.
#[derive(Clone, Debug)]
pub struct InboxSender {
    tx: mpsc::Sender<AppEvent>,
}

impl InboxSender {
    /// Post an event. Events posted after the inbox is dropped are discarded.
    pub fn post<E: Into<AppEvent>>(&self, event: E) {
        let _ = self.tx.send(event.into());
    }
}

/// Single-consumer event inbox drained once per render tick.
///
/// Events from one producer are delivered in the order they were posted.
#[derive(Debug)]
pub struct Inbox {
    tx: mpsc::Sender<AppEvent>,
    rx: mpsc::Receiver<AppEvent>,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    /// Create an empty inbox.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// New producer handle.
    pub fn sender(&self) -> InboxSender {
        InboxSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every event queued so far, without blocking.
    pub fn drain(&self) -> Vec<AppEvent> {
        self.rx.try_iter().collect()
    }

    /// Block for up to `timeout` for the next event.
    pub fn wait(&self, timeout: Duration) -> Option<AppEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}
