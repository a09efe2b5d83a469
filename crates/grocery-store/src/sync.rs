//! Connectivity tracking and reconciliation of offline saves.
//!
//! [`SyncController`] is a two-state machine (`Online`, `Offline`). Going from offline
//! to online triggers [`SyncController::reconcile`], which merges the offline staging
//! buffer into the canonical saved-lists map and clears the buffer. Going offline only
//! produces a status notice.
//!
//! Reconciliation is idempotent: running it with an empty buffer is a no-op, so the
//! trigger may fire zero, one or many times for a single transition.
//!
//! # Example
//!
//! ```
//! use grocery_store_rs::{ListRepository, MemoryStore, StaticProbe, SyncController, Transition};
//!
//! let probe = StaticProbe::new(false);
//! let mut repo = ListRepository::open(MemoryStore::new());
//! let mut sync = SyncController::new(&probe);
//! sync.attach(&mut repo);
//!
//! repo.add_item("Milk", 1)?;
//! repo.save_list("Trip")?; // staged while offline
//!
//! probe.set_online(true);
//! let transition = sync.poll(&mut repo);
//! assert!(matches!(transition, Transition::WentOnline(_)));
//! assert!(repo.canonical_lists().contains_key("Trip"));
//! # Ok::<(), grocery_store_rs::ListError>(())
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::notice::Notice;
use crate::repository::ListRepository;
use crate::store::DurableStore;
use crate::CONNECTIVITY_KEY;

/// Platform sync tag that requests reconciliation of offline saves.
pub const SYNC_TAG: &str = "offline-save-list";

/// Network reachability as seen by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    /// Maps a reachability reading to a state.
    pub fn from_online(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }

    /// True for `Online`.
    pub fn is_online(self) -> bool {
        self == Self::Online
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Offline => f.write_str("offline"),
        }
    }
}

/// Source of the runtime's current connectivity signal.
pub trait ConnectivityProbe {
    /// Whether the network is reachable right now.
    fn is_online(&self) -> bool;
}

impl<P: ConnectivityProbe + ?Sized> ConnectivityProbe for &P {
    fn is_online(&self) -> bool {
        (**self).is_online()
    }
}

/// A probe with a settable answer.
#[derive(Debug)]
pub struct StaticProbe {
    online: AtomicBool,
}

impl StaticProbe {
    /// Creates a probe that reports `online` until told otherwise.
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Changes the answer for later polls.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl ConnectivityProbe for StaticProbe {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// How a staged list is merged when the canonical map already has that name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// The staged copy always replaces the canonical one.
    #[default]
    OfflineWins,
    /// The copy with the later timestamp wins; ties go to the staged copy.
    NewestWins,
}

impl MergePolicy {
    /// Name used in config files and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OfflineWins => "offline-wins",
            Self::NewestWins => "newest-wins",
        }
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offline-wins" => Ok(Self::OfflineWins),
            "newest-wins" => Ok(Self::NewestWins),
            other => Err(format!(
                "unknown merge policy '{other}' (expected offline-wins or newest-wins)"
            )),
        }
    }
}

/// What a reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Staged lists added under names the canonical map did not have.
    pub added: Vec<String>,
    /// Staged lists that replaced a canonical list with the same name.
    pub overwritten: Vec<String>,
    /// Staged lists discarded because the canonical copy was newer.
    pub discarded: Vec<String>,
    /// False if the merged map could not be persisted; the buffer is then kept.
    pub persisted: bool,
}

impl ReconcileReport {
    /// True if nothing was staged.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.overwritten.is_empty() && self.discarded.is_empty()
    }

    /// Number of staged lists that reached the canonical map.
    pub fn merged(&self) -> usize {
        self.added.len() + self.overwritten.len()
    }
}

/// Result of applying a connectivity reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Offline to online; staged saves were reconciled.
    WentOnline(ReconcileReport),
    /// Online to offline.
    WentOffline,
    /// No state change.
    Unchanged,
}

impl Transition {
    /// Status notice for the user, if the state changed.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::WentOnline(_) => Some(Notice::back_online()),
            Self::WentOffline => Some(Notice::gone_offline()),
            Self::Unchanged => None,
        }
    }
}

/// Connectivity state machine that reconciles offline saves on reconnect.
#[derive(Debug)]
pub struct SyncController<P> {
    probe: P,
    state: Connectivity,
    policy: MergePolicy,
}

impl<P: ConnectivityProbe> SyncController<P> {
    /// Starts in whatever state the probe currently reports.
    pub fn new(probe: P) -> Self {
        let state = Connectivity::from_online(probe.is_online());
        Self {
            probe,
            state,
            policy: MergePolicy::default(),
        }
    }

    /// Starts from a previously persisted state, falling back to the probe.
    ///
    /// Lets a process that starts online still notice that the previous run ended
    /// offline, and reconcile on its first poll.
    pub fn resume(probe: P, last_known: Option<Connectivity>) -> Self {
        match last_known {
            Some(state) => Self {
                probe,
                state,
                policy: MergePolicy::default(),
            },
            None => Self::new(probe),
        }
    }

    /// Reads the last persisted connectivity state of `repo`'s store.
    pub fn last_known<S: DurableStore>(repo: &ListRepository<S>) -> Option<Connectivity> {
        repo.store().get(CONNECTIVITY_KEY)
    }

    /// Sets the merge policy.
    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current connectivity state.
    pub fn state(&self) -> Connectivity {
        self.state
    }

    /// True while the controller considers the network reachable.
    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }

    /// Merge policy used by [`reconcile`](Self::reconcile).
    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Aligns the repository's save routing with the controller state.
    pub fn attach<S: DurableStore>(&self, repo: &mut ListRepository<S>) {
        repo.set_connectivity(self.state);
        repo.store().put(CONNECTIVITY_KEY, &self.state);
    }

    /// Reads the probe and applies the result.
    pub fn poll<S: DurableStore>(&mut self, repo: &mut ListRepository<S>) -> Transition {
        let online = self.probe.is_online();
        self.observe(online, repo)
    }

    /// Applies a connectivity reading.
    pub fn observe<S: DurableStore>(
        &mut self,
        online: bool,
        repo: &mut ListRepository<S>,
    ) -> Transition {
        let next = Connectivity::from_online(online);
        let previous = self.state;
        self.state = next;
        self.attach(repo);

        match (previous, next) {
            (Connectivity::Offline, Connectivity::Online) => {
                tracing::info!("connectivity restored, reconciling offline saves");
                Transition::WentOnline(self.reconcile(repo))
            }
            (Connectivity::Online, Connectivity::Offline) => {
                tracing::info!("connectivity lost, staging saves locally");
                Transition::WentOffline
            }
            _ => Transition::Unchanged,
        }
    }

    /// Handles a platform sync event. Only [`SYNC_TAG`] triggers reconciliation.
    pub fn handle_sync_event<S: DurableStore>(
        &self,
        tag: &str,
        repo: &mut ListRepository<S>,
    ) -> Option<ReconcileReport> {
        if tag != SYNC_TAG {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return None;
        }
        Some(self.reconcile(repo))
    }

    /// Merges the staging buffer into the canonical map and clears the buffer.
    ///
    /// Safe to call with an empty buffer and safe to call repeatedly. The buffer is
    /// only cleared once the merged canonical map has been persisted, so a failed write
    /// leaves the staged lists in place for the next attempt.
    pub fn reconcile<S: DurableStore>(&self, repo: &mut ListRepository<S>) -> ReconcileReport {
        let staged = repo.pending();
        if staged.is_empty() {
            return ReconcileReport {
                persisted: true,
                ..ReconcileReport::default()
            };
        }

        repo.absorb_stored_canonical();
        let mut report = ReconcileReport::default();
        let policy = self.policy;
        let canonical = repo.canonical_mut();

        for (name, list) in staged {
            match canonical.get(&name) {
                None => {
                    canonical.insert(name.clone(), list);
                    report.added.push(name);
                }
                Some(existing) => {
                    let staged_wins = match policy {
                        MergePolicy::OfflineWins => true,
                        MergePolicy::NewestWins => list.timestamp >= existing.timestamp,
                    };
                    if staged_wins {
                        canonical.insert(name.clone(), list);
                        report.overwritten.push(name);
                    } else {
                        report.discarded.push(name);
                    }
                }
            }
        }

        report.persisted = repo.persist_saved();
        if report.persisted {
            repo.clear_pending();
        } else {
            tracing::warn!("keeping offline saves staged: canonical map was not persisted");
        }

        tracing::info!(
            added = report.added.len(),
            overwritten = report.overwritten.len(),
            discarded = report.discarded.len(),
            "reconciled offline saves"
        );
        report
    }
}
