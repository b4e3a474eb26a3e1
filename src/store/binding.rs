use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;
use tracing::{debug, warn};

use crate::store::{decode, SlotChange, Store};

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);

/// An in-memory value kept in step with one slot.
///
/// Local changes are written through to the slot immediately. Changes made
/// through other bindings (or direct store writes) are picked up by
/// [`sync`](Self::sync). A cleared slot puts the binding back to its
/// default. Dropping the binding unsubscribes it.
pub struct Binding<T> {
    key: String,
    value: T,
    default: T,
    store: Store,
    id: u64,
    receiver: Option<Receiver<SlotChange>>,
}

impl<T> Binding<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub(crate) fn new(store: Store, key: &str, default: T) -> Self {
        // Subscribe before reading so a write in between is not missed.
        let receiver = store.bus().subscribe(key);
        let value = store.read(key, default.clone());
        Self {
            key: key.to_owned(),
            value,
            default,
            store,
            id: NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed),
            receiver: Some(receiver),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(mut self) -> T
    where
        T: Default,
    {
        std::mem::take(&mut self.value)
    }

    /// Replace the value and persist it.
    ///
    /// If the value cannot be encoded the in-memory value still changes and
    /// the slot keeps its previous contents until the next good write.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Derive the next value from the current one and persist it.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next);
    }

    /// Adopt the newest value written to the slot by anyone else.
    /// Returns `true` if the in-memory value changed.
    pub fn sync(&mut self) -> bool {
        let Some(receiver) = self.receiver.as_mut() else {
            return false;
        };

        let mut latest = None;
        let mut lagged = false;
        loop {
            match receiver.try_recv() {
                Ok(change) if change.origin != self.id => latest = Some(change.raw),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(key = %self.key, skipped, "slot subscriber lagged");
                    lagged = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        let next = if lagged {
            self.store.try_read(&self.key)
        } else {
            match latest {
                Some(Some(raw)) => decode(&self.key, &raw),
                Some(None) => Ok(None),
                None => return false,
            }
        };

        match next {
            Ok(Some(value)) => {
                self.value = value;
                true
            }
            // Cleared or blank.
            Ok(None) => {
                self.value = self.default.clone();
                true
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "ignoring undecodable slot change");
                false
            }
        }
    }

    fn persist(&self) {
        if let Err(err) = self.store.try_write(&self.key, &self.value, self.id) {
            warn!(key = %self.key, error = %err, "dropping slot write");
        }
    }
}

impl<T> Drop for Binding<T> {
    fn drop(&mut self) {
        drop(self.receiver.take());
        self.store.bus().prune(&self.key);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde::ser::Error as _;
    use serde::{Deserialize, Serializer};

    use super::*;

    #[test]
    fn test_binding_starts_from_slot() {
        let store = Store::in_memory();
        store.write("watched", &BTreeSet::from([4u32]));

        let binding = store.bind("watched", BTreeSet::new());
        assert_eq!(binding.get(), &BTreeSet::from([4]));
    }

    #[test]
    fn test_set_persists() {
        let store = Store::in_memory();
        let mut binding = store.bind("counter", 0u32);
        binding.set(5);
        binding.update(|prev| prev + 1);

        assert_eq!(*binding.get(), 6);
        assert_eq!(store.read("counter", 0u32), 6);
    }

    #[test]
    fn test_other_binding_observes_change() {
        let store = Store::in_memory();
        let mut first = store.bind("favorites", Vec::<u32>::new());
        let mut second = store.bind("favorites", Vec::<u32>::new());

        first.set(vec![1, 2]);
        assert!(second.sync());
        assert_eq!(second.get(), &vec![1, 2]);

        // A binding ignores its own writes.
        assert!(!first.sync());
        assert_eq!(first.get(), &vec![1, 2]);
    }

    #[test]
    fn test_second_view_sharing_bus_observes_change() {
        let tab_a = Store::in_memory();
        let tab_b = Store::with_bus(tab_a.storage(), tab_a.bus().clone());

        let mut binding = tab_b.bind("counter", 0);
        tab_a.write("counter", &10);

        assert!(binding.sync());
        assert_eq!(*binding.get(), 10);
    }

    #[test]
    fn test_removal_from_other_view_restores_default() {
        let tab_a = Store::in_memory();
        let tab_b = Store::with_bus(tab_a.storage(), tab_a.bus().clone());
        let mut session = tab_b.bind("user", None::<String>);

        tab_a.write("user", &Some("ana"));
        assert!(session.sync());
        assert_eq!(session.get().as_deref(), Some("ana"));

        tab_a.remove("user");
        assert!(session.sync());
        assert_eq!(session.get(), &None);
        assert!(!session.sync());
    }

    #[test]
    fn test_lagged_binding_sees_cleared_slot() {
        let store = Store::in_memory();
        let mut binding = store.bind("k", 4u32);
        for i in 0..100 {
            store.write("k", &i);
        }
        store.remove("k");

        assert!(binding.sync());
        assert_eq!(*binding.get(), 4);
    }

    #[test]
    fn test_sync_takes_last_write() {
        let store = Store::in_memory();
        let mut binding = store.bind("k", 0);
        store.write("k", &1);
        store.write("k", &2);
        store.write("k", &3);

        assert!(binding.sync());
        assert_eq!(*binding.get(), 3);
        assert!(!binding.sync());
    }

    #[test]
    fn test_lagged_binding_rereads_slot() {
        let store = Store::in_memory();
        let mut binding = store.bind("k", 0);
        for i in 0..100 {
            store.write("k", &i);
        }

        assert!(binding.sync());
        assert_eq!(*binding.get(), 99);
    }

    #[test]
    fn test_unrelated_key_is_ignored() {
        let store = Store::in_memory();
        let mut binding = store.bind("a", 0);
        store.write("b", &1);
        assert!(!binding.sync());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = Store::in_memory();
        let first = store.bind("k", 0);
        let second = store.bind("k", 0);
        assert_eq!(store.bus().subscriber_count("k"), 2);

        drop(first);
        assert_eq!(store.bus().subscriber_count("k"), 1);
        drop(second);
        assert_eq!(store.bus().subscriber_count("k"), 0);
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    enum Cell {
        Good(u32),
        Poisoned,
    }

    impl Serialize for Cell {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Cell::Good(v) => serializer.serialize_newtype_variant("Cell", 0, "Good", v),
                Cell::Poisoned => Err(S::Error::custom("cannot persist")),
            }
        }
    }

    #[test]
    fn test_failed_write_keeps_memory_value() {
        let store = Store::in_memory();
        let mut binding = store.bind("cell", Cell::Good(0));
        binding.set(Cell::Good(1));
        binding.set(Cell::Poisoned);

        assert_eq!(binding.get(), &Cell::Poisoned);
        assert_eq!(store.read("cell", Cell::Good(0)), Cell::Good(1));
    }
}
