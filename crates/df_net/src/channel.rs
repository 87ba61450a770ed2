//! Single-slot, latest-wins mailbox between an update source and the game loop.
//!
//! The source writes from its own thread whenever it likes; the game loop peeks
//! with `has_update` and takes with `get_update` once per simulated frame. A
//! snapshot that is overwritten before it is taken is never observed. The
//! mutex is the only synchronization point between the two sides.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use df_core::{ClientError, Snapshot};

use crate::source::{UpdateListener, UpdateSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Snapshots that passed validation and were stored.
    pub accepted: u64,
    /// Stored snapshots overwritten before anyone took them.
    pub superseded: u64,
    /// Snapshots rejected by validation.
    pub rejected: u64,
}

#[derive(Default)]
struct Mailbox {
    latest: Snapshot,
    has_update: bool,
    received_at: Option<Instant>,
    stats: ChannelStats,
}

impl Mailbox {
    fn accept(&mut self, snapshot: Snapshot) {
        if let Err(e) = snapshot.validate() {
            log::warn!("Dropping snapshot: {e}");
            self.stats.rejected += 1;
            return;
        }
        if self.has_update {
            self.stats.superseded += 1;
            log::trace!("Unread snapshot superseded");
        }
        self.latest = snapshot;
        self.has_update = true;
        self.received_at = Some(Instant::now());
        self.stats.accepted += 1;
    }
}

pub struct UpdateChannel {
    mailbox: Arc<Mutex<Mailbox>>,
    source: Box<dyn UpdateSource>,
    requested: bool,
}

impl UpdateChannel {
    /// Starts empty: `get_update` returns an empty snapshot until the first
    /// one arrives.
    pub fn new(source: Box<dyn UpdateSource>) -> Self {
        Self {
            mailbox: Arc::new(Mutex::new(Mailbox::default())),
            source,
            requested: false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Mailbox> {
        self.mailbox
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A listener that stores into this channel. Safe to call from any thread.
    pub fn listener(&self) -> UpdateListener {
        let mailbox = Arc::clone(&self.mailbox);
        Arc::new(move |snapshot| {
            mailbox
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .accept(snapshot);
        })
    }

    /// Stores `snapshot`, replacing any unread one. Invalid snapshots are
    /// dropped and the previous state is kept.
    pub fn accept_update(&self, snapshot: Snapshot) {
        self.lock().accept(snapshot);
    }

    /// Non-consuming peek.
    pub fn has_update(&self) -> bool {
        self.lock().has_update
    }

    /// Takes the latest snapshot and clears the pending flag. With nothing
    /// pending this returns the last-seen snapshot again.
    pub fn get_update(&self) -> Snapshot {
        let mut mailbox = self.lock();
        mailbox.has_update = false;
        mailbox.latest.clone()
    }

    /// Registers with the source and starts it. Only the first call does
    /// anything.
    pub fn begin_requesting_updates(&mut self) -> Result<(), ClientError> {
        if self.requested {
            log::debug!("Updates already requested");
            return Ok(());
        }
        self.requested = true;
        let listener = self.listener();
        self.source.add_update_listener(listener);
        self.source.start_providing_updates()
    }

    pub fn is_requesting(&self) -> bool {
        self.requested
    }

    /// When the most recent valid snapshot arrived.
    pub fn last_received_at(&self) -> Option<Instant> {
        self.lock().received_at
    }

    pub fn stats(&self) -> ChannelStats {
        self.lock().stats
    }

    pub fn forward_keys(&self, keys: &str) {
        self.source.forward_keys(keys);
    }
}
