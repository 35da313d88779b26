//! Per-listener decision: act once per newly observed revision.

use openhub_core::{Listener, Revision};

use crate::action;
use crate::dispatcher::SyncContext;
use crate::tracker::SyncState;

/// What a single listener's unit ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Build not succeeded, revision unknown, or the build service was
    /// unreachable. Tracker untouched.
    NotReady,
    /// Revision equals the one already handled.
    UpToDate,
    /// New revision, action succeeded.
    Updated(Revision),
    /// New revision, action failed. The revision is recorded anyway and will
    /// not be retried until it changes.
    Failed(Revision),
}

/// Check `listener` against the build service and act if its revision is new.
///
/// Never fails: every error is logged and folded into the returned [`Outcome`].
pub async fn synchronize(ctx: &SyncContext, listener: &Listener, state: &SyncState) -> Outcome {
    if !ctx.status.is_succeeded(listener).await {
        tracing::debug!(listener = %listener.name, "build not succeeded, nothing to do");
        return Outcome::NotReady;
    }

    let Some(revision) = ctx
        .status
        .current_revision(listener)
        .await
        .filter(|rev| !rev.is_empty())
    else {
        tracing::debug!(listener = %listener.name, "no revision available, nothing to do");
        return Outcome::NotReady;
    };

    if state.revisions().get(&listener.name).await.as_ref() == Some(&revision) {
        tracing::info!("{}: everything up-to-date, skipping...", listener.name);
        return Outcome::UpToDate;
    }

    let result = action::perform(ctx.actions.as_ref(), listener).await;
    state
        .revisions()
        .record(&listener.name, revision.clone())
        .await;

    match result {
        Ok(()) => {
            tracing::info!(
                listener = %listener.name,
                mode = %listener.mode,
                "Updated to revision '{}' the tags: {}; for repository '{}'",
                revision,
                listener.quoted_tags(),
                listener.repository,
            );
            Outcome::Updated(revision)
        }
        Err(err) => {
            tracing::error!(
                listener = %listener.name,
                mode = %listener.mode,
                "Failed to update to revision '{}' for the tags: {}; for repository '{}': {}",
                revision,
                listener.quoted_tags(),
                listener.repository,
                err,
            );
            Outcome::Failed(revision)
        }
    }
}
