//! Sequencing of the two downstream actions.

use std::fmt;

use thiserror::Error;

use openhub_core::{ActionMode, Listener};
use openhub_remote::RemoteError;

use crate::collaborator::ActionExecutor;

/// The step of an action that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStep {
    Fetch,
    VerifyAndLoad,
    Push,
    Trigger { tag: String },
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStep::Fetch => write!(f, "artifact download"),
            ActionStep::VerifyAndLoad => write!(f, "image verification and load"),
            ActionStep::Push => write!(f, "image push"),
            ActionStep::Trigger { tag } => write!(f, "trigger for tag '{tag}'"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{step} failed: {source}")]
pub struct ActionError {
    pub step: ActionStep,
    #[source]
    pub source: RemoteError,
}

fn at(step: ActionStep) -> impl FnOnce(RemoteError) -> ActionError {
    move |source| ActionError { step, source }
}

/// Run the action selected by the listener's mode.
pub async fn perform(
    executor: &dyn ActionExecutor,
    listener: &Listener,
) -> Result<(), ActionError> {
    match listener.mode {
        ActionMode::LocalBuild => build_and_push(executor, listener).await,
        ActionMode::RemoteTrigger => trigger_all(executor, listener).await,
    }
}

/// fetch → verify and load → push. The first failing step ends the pipeline;
/// downloads are discarded either way.
async fn build_and_push(
    executor: &dyn ActionExecutor,
    listener: &Listener,
) -> Result<(), ActionError> {
    let result = async {
        let artifacts = executor
            .fetch_artifacts(listener)
            .await
            .map_err(at(ActionStep::Fetch))?;
        executor
            .verify_and_load(listener, &artifacts)
            .await
            .map_err(at(ActionStep::VerifyAndLoad))?;
        executor.push(listener).await.map_err(at(ActionStep::Push))
    }
    .await;
    executor.discard_artifacts(listener).await;
    result
}

/// One webhook call per tag, in order. Stops at the first failure; tags
/// already triggered stay triggered.
async fn trigger_all(
    executor: &dyn ActionExecutor,
    listener: &Listener,
) -> Result<(), ActionError> {
    for tag in &listener.tags {
        executor
            .trigger_tag(&listener.repository, tag)
            .await
            .map_err(at(ActionStep::Trigger { tag: tag.clone() }))?;
    }
    Ok(())
}
