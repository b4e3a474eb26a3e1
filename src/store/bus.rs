use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

/// Notifications buffered per slot before slow subscribers start lagging.
const CHANNEL_CAPACITY: usize = 32;

/// A slot was written.
#[derive(Debug, Clone)]
pub struct SlotChange {
    pub key: String,
    /// Binding that made the write, or `0` for direct store writes.
    pub origin: u64,
    /// The encoded value, exactly as persisted. `None` when the slot was
    /// cleared.
    pub raw: Option<Arc<str>>,
}

impl SlotChange {
    pub(crate) fn new(key: &str, origin: u64, raw: String) -> Self {
        Self {
            key: key.to_owned(),
            origin,
            raw: Some(raw.into()),
        }
    }

    pub(crate) fn removed(key: &str, origin: u64) -> Self {
        Self {
            key: key.to_owned(),
            origin,
            raw: None,
        }
    }
}

/// Publish/subscribe hub keyed by slot name.
///
/// One broadcast channel per key, created on first subscription and
/// dropped once its last subscriber goes away.
#[derive(Debug, Default, Clone)]
pub struct SlotBus {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<SlotChange>>>>,
}

impl SlotBus {
    pub fn subscribe(&self, key: &str) -> broadcast::Receiver<SlotChange> {
        self.channels()
            .entry(key.to_owned())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Send a change to every subscriber of its key. Returns how many
    /// subscribers received it.
    pub fn publish(&self, change: SlotChange) -> usize {
        let channels = self.channels();
        match channels.get(&change.key) {
            Some(sender) => sender.send(change).unwrap_or(0),
            None => 0,
        }
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        self.channels()
            .get(key)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }

    /// Drop the channel for `key` if nobody listens to it anymore.
    pub(crate) fn prune(&self, key: &str) {
        let mut channels = self.channels();
        if channels
            .get(key)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(key);
            debug!(key, "closed slot channel");
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<SlotChange>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
