//! The list repository.
//!
//! [`ListRepository`] owns the working list and the saved-lists map. Every mutation is
//! applied in memory first and then written through to the [`PersistentStore`]. A failed
//! write is logged by the store and never rolls back the in-memory change, so reads
//! within a session always reflect the last mutation.
//!
//! # Example
//!
//! ```
//! use grocery_store_rs::{ListRepository, MemoryStore};
//!
//! let mut repo = ListRepository::open(MemoryStore::new());
//! repo.add_item("Milk", 2)?;
//! repo.save_list("Week1")?;
//! repo.clear_working_list();
//! repo.load_list("Week1")?;
//! assert_eq!(repo.working_list()[0].name, "Milk");
//! # Ok::<(), grocery_store_rs::ListError>(())
//! ```

use std::collections::BTreeSet;

use strsim::levenshtein;
use thiserror::Error;

use crate::staging::OfflineStaging;
use crate::store::{DurableStore, PersistentStore};
use crate::sync::Connectivity;
use crate::{Item, SavedList, SavedListsMap, CURRENT_LIST_KEY, SAVED_LISTS_KEY};

/// Maximum edit distance for "did you mean" suggestions.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Validation errors from repository operations.
///
/// None of these leave any state changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// Item name was empty after trimming.
    #[error("item name must not be empty")]
    EmptyItemName,

    /// Quantity below 1.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),

    /// Index does not address an item of the working list.
    #[error("no item at position {index} (list has {len} items)")]
    IndexOutOfRange {
        /// Requested zero-based index.
        index: usize,
        /// Current length of the working list.
        len: usize,
    },

    /// Attempted to save an empty working list.
    #[error("cannot save an empty list")]
    EmptyList,

    /// List name was empty after trimming.
    #[error("list name must not be empty")]
    EmptyListName,

    /// No saved list with this name.
    #[error("{}", format_not_found(name, suggestion.as_deref()))]
    ListNotFound {
        /// The requested name.
        name: String,
        /// Closest existing name, if any is close enough.
        suggestion: Option<String>,
    },
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, ListError>;

fn format_not_found(name: &str, suggestion: Option<&str>) -> String {
    let base = format!("list '{name}' not found");
    match suggestion {
        Some(s) => format!("{base}. Did you mean '{s}'?"),
        None => base,
    }
}

/// Finds the closest candidate to `query` by case-insensitive Levenshtein distance.
///
/// Exact matches and candidates further than [`MAX_SUGGESTION_DISTANCE`] are ignored.
pub(crate) fn find_similar_name<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| (name, levenshtein(&query_lower, &name.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match.to_string())
    } else {
        None
    }
}

/// Where a `save_list` call put the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the canonical saved-lists map.
    Saved,
    /// Written to the offline staging buffer, pending reconciliation.
    Staged,
}

/// In-memory working list and saved lists, written through to durable storage.
///
/// Offline saves are kept in memory as well as in the staging buffer, so they stay
/// visible even when the buffer cannot be written. Staged copies found in storage are
/// merged in on every read, since another process may have staged them.
#[derive(Debug)]
pub struct ListRepository<S> {
    store: PersistentStore<S>,
    staging: OfflineStaging,
    working: Vec<Item>,
    saved: SavedListsMap,
    /// Lists this session saved offline.
    staged: SavedListsMap,
    /// Stored staged copies this session replaced or deleted but could not remove.
    stale: SavedListsMap,
    /// Names deleted this session. Stored copies of them are never merged back in.
    deleted: BTreeSet<String>,
    connectivity: Connectivity,
}

impl<S: DurableStore> ListRepository<S> {
    /// Loads state from `backend`. Missing or corrupt entries start empty.
    ///
    /// The repository starts `Online`; the sync controller adjusts it.
    pub fn open(backend: S) -> Self {
        let store = PersistentStore::new(backend);
        let working: Vec<Item> = store.get(CURRENT_LIST_KEY).unwrap_or_default();
        let saved: SavedListsMap = store.get(SAVED_LISTS_KEY).unwrap_or_default();
        tracing::debug!(
            items = working.len(),
            saved = saved.len(),
            "opened list repository"
        );
        Self {
            store,
            staging: OfflineStaging,
            working,
            saved,
            staged: SavedListsMap::new(),
            stale: SavedListsMap::new(),
            deleted: BTreeSet::new(),
            connectivity: Connectivity::Online,
        }
    }

    /// Re-reads the working list and saved lists from durable storage.
    ///
    /// Anything this session changed but could not persist is dropped.
    pub fn reload(&mut self) {
        self.working = self.store.get(CURRENT_LIST_KEY).unwrap_or_default();
        self.saved = self.store.get(SAVED_LISTS_KEY).unwrap_or_default();
        self.staged.clear();
        self.stale.clear();
        self.deleted.clear();
    }

    // ==================== Read accessors ====================

    /// The working list.
    pub fn working_list(&self) -> &[Item] {
        &self.working
    }

    /// The canonical saved-lists map, without pending offline saves.
    pub fn canonical_lists(&self) -> &SavedListsMap {
        &self.saved
    }

    /// All saved lists as the user sees them: canonical entries overlaid by
    /// offline-staged entries with the same name.
    pub fn saved_lists(&self) -> SavedListsMap {
        let mut view = self.saved.clone();
        view.extend(self.pending());
        view
    }

    /// Looks up one saved list in the overlaid view.
    pub fn saved_list(&self, name: &str) -> Option<SavedList> {
        let name = name.trim();
        self.pending()
            .remove(name)
            .or_else(|| self.saved.get(name).cloned())
    }

    /// Like [`saved_list`](Self::saved_list), but a miss is a `ListNotFound` error
    /// carrying the closest existing name.
    pub fn find_list(&self, name: &str) -> Result<SavedList> {
        self.saved_list(name).ok_or_else(|| self.not_found(name.trim()))
    }

    /// Names of lists saved offline and not yet reconciled.
    pub fn staged_names(&self) -> Vec<String> {
        self.pending().into_keys().collect()
    }

    /// Current connectivity mode.
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// The typed store backing this repository.
    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    // ==================== Working list ====================

    /// Appends a new, not completed item.
    ///
    /// # Errors
    ///
    /// `EmptyItemName` if `name` trims to nothing, `InvalidQuantity` if `quantity` is 0.
    pub fn add_item(&mut self, name: &str, quantity: u32) -> Result<&Item> {
        let name = validate_item(name, quantity)?;
        self.working.push(Item::new(name, quantity));
        self.persist_working();
        let index = self.working.len() - 1;
        Ok(&self.working[index])
    }

    /// Replaces name and quantity of the item at `index`, keeping its completed flag.
    pub fn update_item(&mut self, index: usize, name: &str, quantity: u32) -> Result<&Item> {
        self.check_index(index)?;
        let name = validate_item(name, quantity)?;
        let item = &mut self.working[index];
        item.name = name.to_string();
        item.quantity = quantity;
        self.persist_working();
        Ok(&self.working[index])
    }

    /// Sets the completed flag of the item at `index`.
    pub fn toggle_item(&mut self, index: usize, completed: bool) -> Result<&Item> {
        self.check_index(index)?;
        self.working[index].completed = completed;
        self.persist_working();
        Ok(&self.working[index])
    }

    /// Removes the item at `index`; later items shift down by one.
    ///
    /// Indices taken before the call are stale afterwards.
    pub fn delete_item(&mut self, index: usize) -> Result<Item> {
        self.check_index(index)?;
        let removed = self.working.remove(index);
        self.persist_working();
        Ok(removed)
    }

    /// Empties the working list.
    pub fn clear_working_list(&mut self) {
        self.working.clear();
        self.persist_working();
    }

    // ==================== Saved lists ====================

    /// Snapshots the working list under `name`, overwriting any list with that name.
    ///
    /// While offline the snapshot goes to the staging buffer instead of the canonical map.
    ///
    /// # Errors
    ///
    /// `EmptyList` if the working list is empty, `EmptyListName` if `name` trims to nothing.
    pub fn save_list(&mut self, name: &str) -> Result<SaveOutcome> {
        if self.working.is_empty() {
            return Err(ListError::EmptyList);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ListError::EmptyListName);
        }

        let snapshot = SavedList::snapshot(&self.working);
        self.deleted.remove(name);
        match self.connectivity {
            Connectivity::Online => {
                self.saved.insert(name.to_string(), snapshot);
                self.persist_saved();
                // Any staged copy of this name is now older than the canonical one
                self.drop_staged(name);
                tracing::debug!(name, "saved list");
                Ok(SaveOutcome::Saved)
            }
            Connectivity::Offline => {
                self.staged.insert(name.to_string(), snapshot.clone());
                self.staging.stage(&self.store, name, snapshot);
                tracing::debug!(name, "staged list while offline");
                Ok(SaveOutcome::Staged)
            }
        }
    }

    /// Replaces the working list with a copy of the saved list `name`.
    pub fn load_list(&mut self, name: &str) -> Result<&[Item]> {
        let list = self.find_list(name)?;
        self.working = list.items;
        self.persist_working();
        Ok(&self.working)
    }

    /// Deletes the saved list `name` from the canonical map and the staging buffer.
    ///
    /// Removing the staged copy too keeps a later reconciliation from bringing it back.
    pub fn delete_list(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        let from_canonical = self.saved.contains_key(name);
        let from_staging = self.pending().contains_key(name);
        if !from_canonical && !from_staging {
            return Err(self.not_found(name));
        }

        self.deleted.insert(name.to_string());
        if self.saved.remove(name).is_some() {
            self.persist_saved();
        }
        self.drop_staged(name);
        tracing::debug!(name, from_canonical, from_staging, "deleted list");
        Ok(())
    }

    // ==================== Crate internals ====================

    pub(crate) fn set_connectivity(&mut self, connectivity: Connectivity) {
        self.connectivity = connectivity;
    }

    /// Staged lists awaiting reconciliation: this session's offline saves overlaid on
    /// the stored buffer, minus stored copies known to be stale.
    pub(crate) fn pending(&self) -> SavedListsMap {
        let mut pending = self.staging.load(&self.store);
        pending.retain(|name, list| {
            !self.deleted.contains(name) && self.stale.get(name) != Some(&*list)
        });
        pending.extend(self.staged.clone());
        pending
    }

    /// Picks up canonical lists another process saved since this repository loaded.
    ///
    /// Lists already in memory and names deleted this session are left alone.
    pub(crate) fn absorb_stored_canonical(&mut self) {
        let Some(stored) = self.store.get::<SavedListsMap>(SAVED_LISTS_KEY) else {
            return;
        };
        for (name, list) in stored {
            if !self.deleted.contains(&name) {
                self.saved.entry(name).or_insert(list);
            }
        }
    }

    /// Empties the staging buffer once its lists are in the canonical map.
    pub(crate) fn clear_pending(&mut self) {
        self.staged.clear();
        let stored = self.staging.load(&self.store);
        if !stored.is_empty() && !self.staging.clear(&self.store) {
            tracing::warn!("staged copies could not be removed from storage");
            self.stale.extend(stored);
        }
    }

    /// Drops any staged copy of `name`, in memory and in storage.
    fn drop_staged(&mut self, name: &str) {
        self.staged.remove(name);
        if let Some(stored) = self.staging.load(&self.store).remove(name) {
            if !self.staging.unstage(&self.store, name) {
                self.stale.insert(name.to_string(), stored);
            }
        }
    }

    pub(crate) fn canonical_mut(&mut self) -> &mut SavedListsMap {
        &mut self.saved
    }

    pub(crate) fn persist_saved(&self) -> bool {
        self.store.put(SAVED_LISTS_KEY, &self.saved)
    }

    fn persist_working(&self) -> bool {
        self.store.put(CURRENT_LIST_KEY, &self.working)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.working.len() {
            Ok(())
        } else {
            Err(ListError::IndexOutOfRange {
                index,
                len: self.working.len(),
            })
        }
    }

    fn not_found(&self, name: &str) -> ListError {
        let view = self.saved_lists();
        ListError::ListNotFound {
            name: name.to_string(),
            suggestion: find_similar_name(name, view.keys().map(String::as_str)),
        }
    }
}

fn validate_item(name: &str, quantity: u32) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ListError::EmptyItemName);
    }
    if quantity == 0 {
        return Err(ListError::InvalidQuantity(quantity));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use crate::OFFLINE_SAVED_LISTS_KEY;

    /// A store whose writes always fail, to exercise best-effort persistence.
    #[derive(Default)]
    struct FailingStore;

    impl DurableStore for FailingStore {
        fn get_raw(&self, _key: &str) -> crate::store::Result<Option<String>> {
            Ok(None)
        }

        fn set_raw(&self, _key: &str, _value: &str) -> crate::store::Result<()> {
            Err(StoreError::QuotaExceeded {
                needed: 1,
                quota: 0,
            })
        }

        fn remove(&self, _key: &str) -> crate::store::Result<()> {
            Ok(())
        }
    }

    fn persisted_working(backend: &MemoryStore) -> Vec<Item> {
        PersistentStore::new(backend)
            .get(CURRENT_LIST_KEY)
            .unwrap_or_default()
    }

    #[test]
    fn test_add_item_appends_and_persists() {
        let backend = MemoryStore::new();
        let mut repo = ListRepository::open(&backend);

        let added = repo.add_item("  Milk  ", 2).unwrap().clone();

        assert_eq!(added, Item::new("Milk", 2));
        assert_eq!(repo.working_list(), &[Item::new("Milk", 2)]);
        assert_eq!(persisted_working(&backend), repo.working_list());
    }

    #[test]
    fn test_add_item_empty_name_is_rejected_without_change() {
        let backend = MemoryStore::new();
        let mut repo = ListRepository::open(&backend);
        repo.add_item("Bread", 1).unwrap();

        assert_eq!(repo.add_item("", 3).unwrap_err(), ListError::EmptyItemName);
        assert_eq!(repo.add_item("   ", 3).unwrap_err(), ListError::EmptyItemName);
        assert_eq!(repo.working_list().len(), 1);
        assert_eq!(persisted_working(&backend).len(), 1);
    }

    #[test]
    fn test_add_item_zero_quantity_is_rejected() {
        let mut repo = ListRepository::open(MemoryStore::new());
        assert_eq!(
            repo.add_item("Milk", 0).unwrap_err(),
            ListError::InvalidQuantity(0)
        );
        assert!(repo.working_list().is_empty());
    }

    #[test]
    fn test_update_item_keeps_completed_flag() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.add_item("Milk", 1).unwrap();
        repo.toggle_item(0, true).unwrap();

        let updated = repo.update_item(0, "Oat milk", 3).unwrap();

        assert_eq!(updated.name, "Oat milk");
        assert_eq!(updated.quantity, 3);
        assert!(updated.completed);
    }

    #[test]
    fn test_update_item_out_of_range() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.add_item("Milk", 1).unwrap();

        assert_eq!(
            repo.update_item(1, "Eggs", 1).unwrap_err(),
            ListError::IndexOutOfRange { index: 1, len: 1 }
        );
    }

    #[test]
    fn test_toggle_item_persists() {
        let backend = MemoryStore::new();
        let mut repo = ListRepository::open(&backend);
        repo.add_item("Milk", 1).unwrap();

        repo.toggle_item(0, true).unwrap();
        assert!(persisted_working(&backend)[0].completed);

        repo.toggle_item(0, false).unwrap();
        assert!(!persisted_working(&backend)[0].completed);
    }

    #[test]
    fn test_delete_item_shifts_following_items() {
        let mut repo = ListRepository::open(MemoryStore::new());
        for name in ["a", "b", "c", "d"] {
            repo.add_item(name, 1).unwrap();
        }

        let removed = repo.delete_item(1).unwrap();

        assert_eq!(removed.name, "b");
        let names: Vec<&str> = repo.working_list().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_delete_item_on_empty_list() {
        let mut repo = ListRepository::open(MemoryStore::new());
        assert_eq!(
            repo.delete_item(0).unwrap_err(),
            ListError::IndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn test_clear_working_list_persists_empty() {
        let backend = MemoryStore::new();
        let mut repo = ListRepository::open(&backend);
        repo.add_item("Milk", 1).unwrap();

        repo.clear_working_list();

        assert!(repo.working_list().is_empty());
        assert_eq!(backend.get_raw(CURRENT_LIST_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_save_empty_list_fails() {
        let mut repo = ListRepository::open(MemoryStore::new());
        assert_eq!(repo.save_list("Week1").unwrap_err(), ListError::EmptyList);
    }

    #[test]
    fn test_save_with_blank_name_fails() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.add_item("Milk", 1).unwrap();
        assert_eq!(repo.save_list("  ").unwrap_err(), ListError::EmptyListName);
        assert!(repo.saved_lists().is_empty());
    }

    #[test]
    fn test_save_is_isolated_from_later_mutation() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.add_item("Milk", 2).unwrap();
        repo.save_list("Week1").unwrap();

        repo.update_item(0, "Cream", 9).unwrap();
        repo.clear_working_list();

        repo.load_list("Week1").unwrap();
        assert_eq!(repo.working_list(), &[Item::new("Milk", 2)]);
    }

    #[test]
    fn test_load_is_isolated_from_saved_snapshot() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.add_item("Milk", 2).unwrap();
        repo.save_list("Week1").unwrap();

        repo.load_list("Week1").unwrap();
        repo.toggle_item(0, true).unwrap();

        assert!(!repo.saved_list("Week1").unwrap().items[0].completed);
    }

    #[test]
    fn test_save_overwrites_existing_name() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.add_item("Milk", 1).unwrap();
        repo.save_list("X").unwrap();
        let first = repo.saved_list("X").unwrap().timestamp;

        repo.clear_working_list();
        repo.add_item("Eggs", 12).unwrap();
        repo.save_list("X").unwrap();

        let lists = repo.saved_lists();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists["X"].items, vec![Item::new("Eggs", 12)]);
        assert!(lists["X"].timestamp >= first);
    }

    #[test]
    fn test_load_missing_list_suggests_close_name() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.add_item("Milk", 1).unwrap();
        repo.save_list("Weekly").unwrap();

        let err = repo.load_list("weekyl").unwrap_err();
        assert_eq!(
            err,
            ListError::ListNotFound {
                name: "weekyl".to_string(),
                suggestion: Some("Weekly".to_string()),
            }
        );
        assert!(err.to_string().contains("Did you mean 'Weekly'?"));
    }

    #[test]
    fn test_load_missing_list_leaves_working_list() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.add_item("Milk", 1).unwrap();

        assert!(repo.load_list("Nope").is_err());
        assert_eq!(repo.working_list().len(), 1);
    }

    #[test]
    fn test_find_list_sees_staged_lists() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.set_connectivity(Connectivity::Offline);
        repo.add_item("Milk", 1).unwrap();
        repo.save_list("Trip").unwrap();

        assert_eq!(repo.find_list(" Trip ").unwrap().items.len(), 1);
        assert!(matches!(
            repo.find_list("Tripp"),
            Err(ListError::ListNotFound { suggestion: Some(_), .. })
        ));
    }

    #[test]
    fn test_delete_list_removes_entry() {
        let backend = MemoryStore::new();
        let mut repo = ListRepository::open(&backend);
        repo.add_item("Milk", 1).unwrap();
        repo.save_list("Week1").unwrap();

        repo.delete_list("Week1").unwrap();

        assert!(repo.saved_lists().is_empty());
        let persisted: SavedListsMap = PersistentStore::new(&backend)
            .get(SAVED_LISTS_KEY)
            .unwrap();
        assert!(persisted.is_empty());
    }

    #[test]
    fn test_delete_unknown_list_is_not_found() {
        let mut repo = ListRepository::open(MemoryStore::new());
        assert!(matches!(
            repo.delete_list("Ghost"),
            Err(ListError::ListNotFound { .. })
        ));
    }

    #[test]
    fn test_offline_save_is_staged_and_visible() {
        let backend = MemoryStore::new();
        let mut repo = ListRepository::open(&backend);
        repo.set_connectivity(Connectivity::Offline);
        repo.add_item("Milk", 1).unwrap();

        assert_eq!(repo.save_list("Trip").unwrap(), SaveOutcome::Staged);

        assert!(repo.canonical_lists().is_empty());
        assert!(repo.saved_lists().contains_key("Trip"));
        assert_eq!(repo.staged_names(), vec!["Trip".to_string()]);
        assert!(backend.get_raw(OFFLINE_SAVED_LISTS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_offline_saved_list_can_be_loaded() {
        let mut repo = ListRepository::open(MemoryStore::new());
        repo.set_connectivity(Connectivity::Offline);
        repo.add_item("Milk", 1).unwrap();
        repo.save_list("Trip").unwrap();
        repo.clear_working_list();

        repo.load_list("Trip").unwrap();
        assert_eq!(repo.working_list(), &[Item::new("Milk", 1)]);
    }

    #[test]
    fn test_delete_list_also_drops_staged_copy() {
        let backend = MemoryStore::new();
        let mut repo = ListRepository::open(&backend);
        repo.add_item("Milk", 1).unwrap();
        repo.save_list("Trip").unwrap();
        repo.set_connectivity(Connectivity::Offline);
        repo.save_list("Trip").unwrap();

        repo.delete_list("Trip").unwrap();

        assert!(repo.saved_lists().is_empty());
        assert!(repo.staged_names().is_empty());
    }

    #[test]
    fn test_failed_writes_keep_in_memory_state() {
        let mut repo = ListRepository::open(FailingStore);

        repo.add_item("Milk", 2).unwrap();
        repo.add_item("Eggs", 6).unwrap();
        repo.save_list("Week1").unwrap();
        repo.delete_item(0).unwrap();

        assert_eq!(repo.working_list(), &[Item::new("Eggs", 6)]);
        assert!(repo.saved_lists().contains_key("Week1"));
    }

    #[test]
    fn test_failed_staging_write_keeps_offline_save() {
        let mut repo = ListRepository::open(FailingStore);
        repo.set_connectivity(Connectivity::Offline);
        repo.add_item("Milk", 1).unwrap();

        assert_eq!(repo.save_list("Trip").unwrap(), SaveOutcome::Staged);
        repo.clear_working_list();

        assert!(repo.saved_lists().contains_key("Trip"));
        assert_eq!(repo.staged_names(), vec!["Trip".to_string()]);
        repo.load_list("Trip").unwrap();
        assert_eq!(repo.working_list(), &[Item::new("Milk", 1)]);
    }

    #[test]
    fn test_online_save_replaces_staged_copy() {
        let backend = MemoryStore::new();
        let mut repo = ListRepository::open(&backend);
        repo.add_item("Old", 1).unwrap();
        repo.set_connectivity(Connectivity::Offline);
        repo.save_list("X").unwrap();

        repo.set_connectivity(Connectivity::Online);
        repo.clear_working_list();
        repo.add_item("New", 9).unwrap();
        assert_eq!(repo.save_list("X").unwrap(), SaveOutcome::Saved);

        assert_eq!(repo.saved_list("X").unwrap().items, vec![Item::new("New", 9)]);
        assert!(repo.staged_names().is_empty());
        assert!(backend.get_raw(OFFLINE_SAVED_LISTS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_reload_picks_up_stored_state() {
        let backend = MemoryStore::new();
        let mut repo = ListRepository::open(&backend);
        repo.add_item("Milk", 1).unwrap();
        repo.save_list("Week1").unwrap();

        // Another process empties the working list
        PersistentStore::new(&backend).put(CURRENT_LIST_KEY, &Vec::<Item>::new());
        repo.reload();

        assert!(repo.working_list().is_empty());
        assert!(repo.saved_lists().contains_key("Week1"));
    }

    #[test]
    fn test_open_restores_persisted_state() {
        let backend = MemoryStore::new();
        {
            let mut repo = ListRepository::open(&backend);
            repo.add_item("Milk", 2).unwrap();
            repo.save_list("Week1").unwrap();
        }

        let repo = ListRepository::open(&backend);
        assert_eq!(repo.working_list(), &[Item::new("Milk", 2)]);
        assert!(repo.saved_lists().contains_key("Week1"));
    }

    #[test]
    fn test_open_with_corrupt_state_starts_empty() {
        let backend = MemoryStore::new();
        backend.set_raw(CURRENT_LIST_KEY, "not json").unwrap();
        backend.set_raw(SAVED_LISTS_KEY, "[1,2,3]").unwrap();

        let repo = ListRepository::open(&backend);
        assert!(repo.working_list().is_empty());
        assert!(repo.saved_lists().is_empty());
    }

    #[test]
    fn test_find_similar_name_ignores_exact_and_distant() {
        let names = ["Week1", "Party"];
        assert_eq!(find_similar_name("Week1", names.iter().copied()), None);
        assert_eq!(find_similar_name("Groceries", names.iter().copied()), None);
        assert_eq!(
            find_similar_name("week2", names.iter().copied()),
            Some("Week1".to_string())
        );
    }
}
