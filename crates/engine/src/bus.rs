//! Snapshot fan-out backed by a `tokio::sync::broadcast` channel.
//!
//! Every state change of a [`Scheduler`](crate::Scheduler) is published as a
//! full [`SessionSnapshot`]; renderers subscribe and redraw from it.

use batchsim_core::metrics::SessionSnapshot;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out of session snapshots.
///
/// When the buffer is full the oldest snapshots are dropped and slow
/// receivers observe `RecvError::Lagged`; since each snapshot is complete,
/// a lagged receiver only needs the next one.
pub struct SnapshotBus {
    sender: broadcast::Sender<SessionSnapshot>,
}

impl SnapshotBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a snapshot to all current subscribers.
    ///
    /// Silently dropped when nobody is listening.
    pub fn publish(&self, snapshot: SessionSnapshot) {
        let _ = self.sender.send(snapshot);
    }

    /// Whether anyone would receive a published snapshot.
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.sender.subscribe()
    }
}

impl Default for SnapshotBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
