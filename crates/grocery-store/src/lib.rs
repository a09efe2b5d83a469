//! Offline-capable persistence for grocery lists.
//!
//! This crate holds the working list and the named snapshots a user saves from it,
//! writes every change through to durable storage, stages saves made while offline
//! and merges them back into the canonical map once connectivity returns.
//!
//! # Layers
//!
//! - [`store`] - best-effort key-value persistence ([`DurableStore`], [`PersistentStore`])
//! - [`staging`] - the offline staging buffer
//! - [`repository`] - the [`ListRepository`] consumed by front ends
//! - [`sync`] - connectivity state machine and reconciliation ([`SyncController`])
//! - [`share`] - plain-text export and share/clipboard fallback
//! - [`notice`] - transient user-facing notifications

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod notice;
pub mod repository;
pub mod share;
pub mod staging;
pub mod store;
pub mod sync;

pub use notice::{Notice, NoticeLevel, NOTICE_DURATION};
pub use repository::{ListError, ListRepository, SaveOutcome};
pub use staging::OfflineStaging;
pub use store::{DurableStore, FileStore, MemoryStore, PersistentStore, StoreError};
pub use sync::{
    Connectivity, ConnectivityProbe, MergePolicy, ReconcileReport, StaticProbe, SyncController,
    Transition, SYNC_TAG,
};

/// Storage key holding the working list.
pub const CURRENT_LIST_KEY: &str = "currentList";

/// Storage key holding the canonical saved-lists map.
pub const SAVED_LISTS_KEY: &str = "savedLists";

/// Storage key holding saves made while offline.
pub const OFFLINE_SAVED_LISTS_KEY: &str = "offlineSavedLists";

/// Storage key holding the last observed connectivity state.
pub const CONNECTIVITY_KEY: &str = "connectivity";

/// A single grocery item.
///
/// Items have no stable identifier; they are addressed by their position in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item name, never empty after trimming.
    pub name: String,

    /// How many to buy, at least 1.
    pub quantity: u32,

    /// Whether the item has been picked up.
    #[serde(default)]
    pub completed: bool,
}

impl Item {
    /// Creates a new, not yet completed item.
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
            completed: false,
        }
    }
}

/// A named, timestamped snapshot of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedList {
    /// Snapshot of the items at save time. Never shared with the working list.
    pub items: Vec<Item>,

    /// Creation or last overwrite time.
    pub timestamp: DateTime<Utc>,
}

impl SavedList {
    /// Snapshots `items` at the current time.
    pub fn snapshot(items: &[Item]) -> Self {
        Self::snapshot_at(items, Utc::now())
    }

    /// Snapshots `items` with an explicit timestamp.
    pub fn snapshot_at(items: &[Item], timestamp: DateTime<Utc>) -> Self {
        Self {
            items: items.to_vec(),
            timestamp,
        }
    }
}

/// Mapping from list name to saved snapshot.
///
/// Used for both the canonical map and the offline staging map.
pub type SavedListsMap = BTreeMap<String, SavedList>;
