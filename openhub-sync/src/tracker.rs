//! Process-lifetime synchronization state.
//!
//! Nothing here is persisted: a restart forgets every revision, so the first
//! pass after startup acts on every listener whose build succeeded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use openhub_core::{ListenerName, Revision};

/// Last handled revision per listener. Entries are overwritten, never removed.
///
/// Concurrent units each touch only their own key; the lock only serializes
/// access to the map itself.
#[derive(Debug, Default)]
pub struct RevisionTracker {
    revisions: RwLock<HashMap<ListenerName, Revision>>,
}

impl RevisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, name: &ListenerName) -> Option<Revision> {
        self.revisions.read().await.get(name).cloned()
    }

    /// Store `revision` for `name`, returning the previous value.
    pub async fn record(&self, name: &ListenerName, revision: Revision) -> Option<Revision> {
        self.revisions.write().await.insert(name.clone(), revision)
    }

    pub async fn snapshot(&self) -> HashMap<ListenerName, Revision> {
        self.revisions.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.revisions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.revisions.read().await.is_empty()
    }
}

/// Shared between the scheduler, which reads the done flag on every tick, and
/// the dispatcher, which sets it once every unit of a pass has finished.
#[derive(Debug, Default)]
pub struct SyncState {
    done: AtomicBool,
    revisions: RevisionTracker,
}

impl SyncState {
    /// Fresh state: no revisions, no pass finished yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the most recently started pass has joined all its units.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
    }

    /// Clear the done flag if it is set. Returns false, leaving the flag
    /// untouched, while a pass is still in flight.
    pub fn try_begin_pass(&self) -> bool {
        self.done
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn revisions(&self) -> &RevisionTracker {
        &self.revisions
    }
}
