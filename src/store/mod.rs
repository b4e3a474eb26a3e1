//! Typed values bound to named durable slots.
//!
//! Every slot holds one JSON document. Reads never fail: a missing, empty,
//! or malformed slot yields the caller's default. Writes never fail either:
//! a value that cannot be encoded is dropped with a warning. Successful
//! writes and removals are broadcast on a [`SlotBus`] so live [`Binding`]s
//! on the same key converge. There is no locking; the last write to a slot wins.

mod binding;
mod bus;
mod file;
mod memory;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MatchdayError, Result};

pub use binding::Binding;
pub use bus::{SlotBus, SlotChange};
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Origin id used for writes that do not come from a [`Binding`].
pub(crate) const DIRECT_WRITE: u64 = 0;

/// A durable backend holding raw slot text.
pub trait SlotStorage: Send + Sync {
    /// Raw text of a slot, or `None` if it was never written.
    fn load(&self, key: &str) -> Result<Option<String>>;

    fn save(&self, key: &str, raw: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Handle to the persisted state. Clones share the backend and the bus.
#[derive(Clone)]
pub struct Store {
    storage: Arc<dyn SlotStorage>,
    bus: SlotBus,
}

impl Store {
    /// Create a store over `storage` with its own bus.
    pub fn new(storage: impl SlotStorage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
            bus: SlotBus::default(),
        }
    }

    /// A non-durable store, mostly for tests.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    /// Create a store that shares an existing backend and bus, the way a
    /// second open view of the app shares the browser's storage.
    pub fn with_bus(storage: Arc<dyn SlotStorage>, bus: SlotBus) -> Self {
        Self { storage, bus }
    }

    pub fn storage(&self) -> Arc<dyn SlotStorage> {
        Arc::clone(&self.storage)
    }

    pub fn bus(&self) -> &SlotBus {
        &self.bus
    }

    /// Value stored at `key`, or `default` when the slot is absent, empty,
    /// or does not decode.
    pub fn read<T, K>(&self, key: K, default: T) -> T
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        let key = key.as_ref();
        match self.try_read(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                warn!(key, error = %err, "falling back to default slot value");
                default
            }
        }
    }

    /// Replace the value at `key`. Encoding or storage failures are logged
    /// and the write is dropped.
    pub fn write<T, K>(&self, key: K, value: &T)
    where
        T: Serialize + ?Sized,
        K: AsRef<str>,
    {
        let key = key.as_ref();
        if let Err(err) = self.try_write(key, value, DIRECT_WRITE) {
            warn!(key, error = %err, "dropping slot write");
        }
    }

    /// Compute the next value from the current one and write it.
    ///
    /// Sequential updates compose. The read-modify-write is not atomic
    /// across stores sharing one backend.
    pub fn update<T, K, F>(&self, key: K, default: T, f: F) -> T
    where
        T: Serialize + DeserializeOwned,
        K: AsRef<str>,
        F: FnOnce(T) -> T,
    {
        let key = key.as_ref();
        let next = f(self.read(key, default));
        self.write(key, &next);
        next
    }

    /// Clear a slot. Bindings on the key fall back to their defaults.
    pub fn remove<K: AsRef<str>>(&self, key: K) {
        let key = key.as_ref();
        if let Err(err) = self.storage.remove(key) {
            warn!(key, error = %err, "failed to clear slot");
            return;
        }
        let receivers = self.bus.publish(SlotChange::removed(key, DIRECT_WRITE));
        debug!(key, receivers, "slot cleared");
    }

    /// Whether the slot currently holds any non-blank text.
    pub fn contains<K: AsRef<str>>(&self, key: K) -> bool {
        matches!(self.storage.load(key.as_ref()), Ok(Some(raw)) if !raw.trim().is_empty())
    }

    /// Bind `key` to a live in-memory value, starting from the slot's
    /// current contents.
    pub fn bind<T, K>(&self, key: K, default: T) -> Binding<T>
    where
        T: Serialize + DeserializeOwned + Clone,
        K: AsRef<str>,
    {
        Binding::new(self.clone(), key.as_ref(), default)
    }

    pub(crate) fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.storage.load(key)? else {
            return Ok(None);
        };
        decode(key, &raw)
    }

    pub(crate) fn try_write<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        origin: u64,
    ) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| MatchdayError::Serialize {
            key: key.to_owned(),
            source,
        })?;
        self.storage.save(key, &raw)?;
        let receivers = self.bus.publish(SlotChange::new(key, origin, raw));
        debug!(key, receivers, "slot written");
        Ok(())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("bus", &self.bus).finish_non_exhaustive()
    }
}

/// Decode raw slot text. Blank text counts as an absent slot.
pub(crate) fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Option<T>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|source| MatchdayError::Deserialize {
            key: key.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::ser::Error as _;
    use serde::Serializer;

    use super::*;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("not representable"))
        }
    }

    #[test]
    fn test_write_then_read() {
        let store = Store::in_memory();
        let value = BTreeMap::from([("a".to_string(), 1)]);
        store.write("k", &value);

        let read: BTreeMap<String, i32> = store.read("k", BTreeMap::new());
        assert_eq!(read, value);
    }

    #[test]
    fn test_read_missing_returns_default() {
        let store = Store::in_memory();
        assert_eq!(store.read("never", vec![1, 2]), vec![1, 2]);
    }

    #[test]
    fn test_read_corrupt_returns_default() {
        let store = Store::in_memory();
        store.storage().save("k", "{not json").unwrap();

        let fallback = BTreeMap::from([("fallback".to_string(), true)]);
        let read: BTreeMap<String, bool> = store.read("k", fallback.clone());
        assert_eq!(read, fallback);
    }

    #[test]
    fn test_read_wrong_shape_returns_default() {
        let store = Store::in_memory();
        store.write("k", &"a string");
        assert_eq!(store.read("k", 7u32), 7);
    }

    #[test]
    fn test_read_blank_returns_default() {
        let store = Store::in_memory();
        store.storage().save("k", "   ").unwrap();
        assert_eq!(store.read("k", 3u8), 3);
        assert!(!store.contains("k"));
    }

    #[test]
    fn test_update_twice_adds_two() {
        let store = Store::in_memory();
        store.update("counter", 0, |prev: i32| prev + 1);
        store.update("counter", 0, |prev: i32| prev + 1);
        assert_eq!(store.read("counter", 0), 2);
    }

    #[test]
    fn test_unserializable_write_is_dropped() {
        let store = Store::in_memory();
        store.write("k", &5);
        store.write("k", &Unserializable);
        assert_eq!(store.read("k", 0), 5);
    }

    #[test]
    fn test_remove_clears_slot() {
        let store = Store::in_memory();
        store.write("k", &1);
        assert!(store.contains("k"));
        store.remove("k");
        assert!(!store.contains("k"));
        assert_eq!(store.read("k", 9), 9);
    }
}
