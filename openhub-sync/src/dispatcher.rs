//! One synchronization pass: every listener concurrently, then a join barrier.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::Instant;

use openhub_core::{Configuration, Listener};

use crate::collaborator::{ActionExecutor, StatusSource};
use crate::engine::{synchronize, Outcome};
use crate::tracker::SyncState;

/// Immutable inputs shared by every unit of every pass.
#[derive(Clone)]
pub struct SyncContext {
    pub config: Arc<Configuration>,
    pub status: Arc<dyn StatusSource>,
    pub actions: Arc<dyn ActionExecutor>,
}

impl SyncContext {
    pub fn new(
        config: Configuration,
        status: Arc<dyn StatusSource>,
        actions: Arc<dyn ActionExecutor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            status,
            actions,
        }
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.config.listeners
    }
}

impl fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Tally of one pass, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub listeners: usize,
    pub updated: usize,
    pub failed: usize,
    pub up_to_date: usize,
    pub not_ready: usize,
    /// Units that panicked instead of returning an outcome.
    pub crashed: usize,
    pub duration_ms: u128,
}

impl PassSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Updated(_) => self.updated += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::UpToDate => self.up_to_date += 1,
            Outcome::NotReady => self.not_ready += 1,
        }
    }
}

/// Run [`synchronize`] for every configured listener concurrently.
///
/// A failing or panicking unit never affects its siblings. The state's done
/// flag is set strictly after all units have finished.
pub async fn run_pass(ctx: &SyncContext, state: &Arc<SyncState>) -> PassSummary {
    let started = Instant::now();
    let mut units = JoinSet::new();

    for listener in ctx.listeners().iter().cloned() {
        let ctx = ctx.clone();
        let state = Arc::clone(state);
        units.spawn(async move { synchronize(&ctx, &listener, &state).await });
    }

    let mut summary = PassSummary {
        listeners: ctx.listeners().len(),
        ..PassSummary::default()
    };
    while let Some(joined) = units.join_next().await {
        match joined {
            Ok(outcome) => summary.record(&outcome),
            Err(err) => {
                tracing::error!(error = %err, "listener task did not complete");
                summary.crashed += 1;
            }
        }
    }
    summary.duration_ms = started.elapsed().as_millis();

    state.mark_done();
    tracing::info!(
        listeners = summary.listeners,
        updated = summary.updated,
        failed = summary.failed,
        up_to_date = summary.up_to_date,
        not_ready = summary.not_ready,
        duration_ms = summary.duration_ms,
        "synchronization pass completed",
    );
    summary
}
