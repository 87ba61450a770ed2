use std::sync::{Arc, Mutex};

use df_core::{ClientError, Snapshot};

/// Called with every snapshot a source produces, possibly from another thread.
pub type UpdateListener = Arc<dyn Fn(Snapshot) + Send + Sync>;

/// Anything that produces snapshots on its own schedule.
pub trait UpdateSource: Send {
    fn add_update_listener(&mut self, listener: UpdateListener);

    /// Starts delivery. Snapshots arrive asynchronously afterwards.
    fn start_providing_updates(&mut self) -> Result<(), ClientError>;

    /// Held keys, comma-joined, for sources that talk to a real server.
    fn forward_keys(&self, _keys: &str) {}
}

/// Shared listener list a source's worker can broadcast through.
#[derive(Clone, Default)]
pub struct Listeners(Arc<Mutex<Vec<UpdateListener>>>);

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, listener: UpdateListener) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
    }

    /// Hands `snapshot` to every registered listener, in registration order.
    pub fn broadcast(&self, snapshot: &Snapshot) {
        // Listeners run outside the lock so one may register another.
        let listeners: Vec<UpdateListener> = self
            .0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for listener in listeners {
            listener(snapshot.clone());
        }
    }
}
