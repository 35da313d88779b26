//! # openhub-sync
//!
//! The synchronization core: decide, per listener, whether the build service
//! has produced a revision that was not handled yet, and act on it once.
//!
//! - [`tracker`]: [`SyncState`], the pass-done flag plus the per-listener revision map
//! - [`engine`]: [`synchronize`] one listener
//! - [`dispatcher`]: [`run_pass`] over every listener concurrently
//! - [`action`]: sequencing of the local build pipeline and the remote trigger
//! - [`collaborator`]: the traits the core consumes; [`adapters`] backs them
//!   with `openhub-remote`

pub mod action;
pub mod adapters;
pub mod collaborator;
pub mod dispatcher;
pub mod engine;
pub mod tracker;

pub use action::{ActionError, ActionStep};
pub use adapters::{connect, RemoteActions, RemoteStatus};
pub use collaborator::{ActionExecutor, StatusSource};
pub use dispatcher::{run_pass, PassSummary, SyncContext};
pub use engine::{synchronize, Outcome};
pub use tracker::{RevisionTracker, SyncState};
