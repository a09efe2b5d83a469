//! Offline staging buffer.
//!
//! Saves made while offline land here, under the `offlineSavedLists` key, until the
//! sync controller merges them into the canonical map. This handle only talks to durable
//! storage, so writes staged by another process are not missed. The repository keeps its
//! own in-memory copy of what it staged; a write failure reported here never loses a save.

use crate::store::{DurableStore, PersistentStore};
use crate::{SavedList, SavedListsMap, OFFLINE_SAVED_LISTS_KEY};

/// Handle to the staging map in durable storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineStaging;

impl OfflineStaging {
    /// Reads the current staging map. Missing or unreadable data is an empty map.
    pub fn load<S: DurableStore>(&self, store: &PersistentStore<S>) -> SavedListsMap {
        store.get(OFFLINE_SAVED_LISTS_KEY).unwrap_or_default()
    }

    /// Stages `list` under `name`, replacing any staged list with the same name.
    ///
    /// Returns false if the buffer could not be written.
    pub fn stage<S: DurableStore>(
        &self,
        store: &PersistentStore<S>,
        name: &str,
        list: SavedList,
    ) -> bool {
        let mut staged = self.load(store);
        staged.insert(name.to_string(), list);
        let persisted = store.put(OFFLINE_SAVED_LISTS_KEY, &staged);
        if !persisted {
            tracing::warn!(name, "offline save is held in memory only");
        }
        persisted
    }

    /// Drops a staged list from storage.
    ///
    /// Returns true once storage no longer holds a staged copy of `name`, including when
    /// there was none. False means the copy is still on disk.
    pub fn unstage<S: DurableStore>(&self, store: &PersistentStore<S>, name: &str) -> bool {
        let mut staged = self.load(store);
        if staged.remove(name).is_none() {
            return true;
        }
        let persisted = if staged.is_empty() {
            store.remove(OFFLINE_SAVED_LISTS_KEY)
        } else {
            store.put(OFFLINE_SAVED_LISTS_KEY, &staged)
        };
        if !persisted {
            tracing::warn!(name, "staged copy could not be removed from storage");
        }
        persisted
    }

    /// Empties the buffer.
    pub fn clear<S: DurableStore>(&self, store: &PersistentStore<S>) -> bool {
        store.remove(OFFLINE_SAVED_LISTS_KEY)
    }

    /// Number of staged lists.
    pub fn len<S: DurableStore>(&self, store: &PersistentStore<S>) -> usize {
        self.load(store).len()
    }

    /// Returns true if nothing is staged.
    pub fn is_empty<S: DurableStore>(&self, store: &PersistentStore<S>) -> bool {
        self.len(store) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use crate::Item;

    /// Reads from an inner memory store but rejects every write.
    struct ReadOnlyStore(MemoryStore);

    impl DurableStore for ReadOnlyStore {
        fn get_raw(&self, key: &str) -> crate::store::Result<Option<String>> {
            self.0.get_raw(key)
        }

        fn set_raw(&self, _key: &str, _value: &str) -> crate::store::Result<()> {
            Err(StoreError::QuotaExceeded {
                needed: 1,
                quota: 0,
            })
        }

        fn remove(&self, _key: &str) -> crate::store::Result<()> {
            Err(StoreError::QuotaExceeded {
                needed: 1,
                quota: 0,
            })
        }
    }

    fn store() -> PersistentStore<MemoryStore> {
        PersistentStore::new(MemoryStore::new())
    }

    #[test]
    fn test_empty_by_default() {
        let store = store();
        assert!(OfflineStaging.is_empty(&store));
        assert!(OfflineStaging.load(&store).is_empty());
    }

    #[test]
    fn test_stage_overwrites_same_name() {
        let store = store();
        OfflineStaging.stage(&store, "Week1", SavedList::snapshot(&[Item::new("Milk", 1)]));
        OfflineStaging.stage(&store, "Week1", SavedList::snapshot(&[Item::new("Eggs", 6)]));

        let staged = OfflineStaging.load(&store);
        assert_eq!(staged.len(), 1);
        assert_eq!(staged["Week1"].items, vec![Item::new("Eggs", 6)]);
    }

    #[test]
    fn test_unstage_last_entry_removes_key() {
        let store = store();
        OfflineStaging.stage(&store, "Party", SavedList::snapshot(&[Item::new("Chips", 3)]));

        assert!(OfflineStaging.unstage(&store, "Party"));
        assert!(store.backend().is_empty());
        // Nothing left to remove
        assert!(OfflineStaging.unstage(&store, "Party"));
    }

    #[test]
    fn test_unstage_reports_failed_rewrite() {
        let inner = MemoryStore::new();
        OfflineStaging.stage(
            &PersistentStore::new(&inner),
            "Party",
            SavedList::snapshot(&[Item::new("Chips", 3)]),
        );
        let store = PersistentStore::new(ReadOnlyStore(inner));

        assert!(!OfflineStaging.unstage(&store, "Party"));
        assert_eq!(OfflineStaging.len(&store), 1);
    }

    #[test]
    fn test_stage_reports_failed_write() {
        let store = PersistentStore::new(ReadOnlyStore(MemoryStore::new()));

        assert!(!OfflineStaging.stage(&store, "Trip", SavedList::snapshot(&[Item::new("x", 1)])));
        assert!(OfflineStaging.is_empty(&store));
    }

    #[test]
    fn test_clear_empties_buffer() {
        let store = store();
        OfflineStaging.stage(&store, "A", SavedList::snapshot(&[Item::new("x", 1)]));
        OfflineStaging.stage(&store, "B", SavedList::snapshot(&[Item::new("y", 1)]));
        assert_eq!(OfflineStaging.len(&store), 2);

        OfflineStaging.clear(&store);
        assert!(OfflineStaging.is_empty(&store));
    }
}
