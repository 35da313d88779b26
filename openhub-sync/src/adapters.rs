//! Collaborator traits backed by the real build service, registry and engine.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use openhub_core::{Configuration, Listener, Revision};
use openhub_remote::{artifacts, Artifacts, ContainerEngine, HubClient, ObsClient, RemoteError};

use crate::collaborator::{ActionExecutor, StatusSource};
use crate::dispatcher::SyncContext;

/// Build the production [`SyncContext`] for `config`.
pub fn connect(config: Configuration) -> Result<SyncContext, RemoteError> {
    let timeout = config.options.request_timeout;
    let obs = ObsClient::new(&config.credentials, timeout)?;
    let status = RemoteStatus::new(obs.clone());
    let actions = RemoteActions {
        obs,
        engine: ContainerEngine::new(config.options.engine.clone()),
        hub: HubClient::new(&config.credentials, timeout)?,
        token: config.credentials.token.clone(),
        download_dir: config.options.download_dir.clone(),
    };
    Ok(SyncContext::new(config, Arc::new(status), Arc::new(actions)))
}

fn log_failure(listener: &Listener, what: &str, err: &RemoteError) {
    if err.is_timeout() {
        tracing::warn!(listener = %listener.name, error = %err, "timed out while {what}");
    } else {
        tracing::warn!(listener = %listener.name, error = %err, "error while {what}");
    }
}

/// [`StatusSource`] over the build service. Failures become "unavailable".
#[derive(Debug, Clone)]
pub struct RemoteStatus {
    obs: ObsClient,
}

impl RemoteStatus {
    pub fn new(obs: ObsClient) -> Self {
        Self { obs }
    }
}

#[async_trait]
impl StatusSource for RemoteStatus {
    async fn is_succeeded(&self, listener: &Listener) -> bool {
        match self.obs.build_state(listener).await {
            Ok(state) => {
                if !state.is_succeeded() {
                    tracing::debug!(listener = %listener.name, state = ?state, "build not finished");
                }
                state.is_succeeded()
            }
            Err(err) => {
                log_failure(listener, "checking the build status", &err);
                false
            }
        }
    }

    async fn current_revision(&self, listener: &Listener) -> Option<Revision> {
        match self.obs.revision(listener).await {
            Ok(revision) => revision,
            Err(err) => {
                log_failure(listener, "fetching the build revision", &err);
                None
            }
        }
    }
}

/// [`ActionExecutor`] over the build service, local engine and registry.
#[derive(Clone)]
pub struct RemoteActions {
    obs: ObsClient,
    engine: ContainerEngine,
    hub: HubClient,
    token: String,
    download_dir: PathBuf,
}

impl fmt::Debug for RemoteActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteActions")
            .field("engine", &self.engine)
            .field("hub", &self.hub)
            .field("download_dir", &self.download_dir)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ActionExecutor for RemoteActions {
    async fn fetch_artifacts(&self, listener: &Listener) -> Result<Artifacts, RemoteError> {
        artifacts::fetch(&self.obs, listener, &self.download_dir).await
    }

    async fn verify_and_load(
        &self,
        listener: &Listener,
        artifacts: &Artifacts,
    ) -> Result<(), RemoteError> {
        artifacts::verify(artifacts).await?;
        self.engine.remove_images(listener).await;
        self.engine.load(&artifacts.tarball).await
    }

    async fn push(&self, listener: &Listener) -> Result<(), RemoteError> {
        self.engine.push(listener).await
    }

    async fn trigger_tag(&self, repository: &str, tag: &str) -> Result<(), RemoteError> {
        self.hub.trigger_tag(&self.token, repository, tag).await
    }

    async fn discard_artifacts(&self, listener: &Listener) {
        artifacts::discard(&self.download_dir, listener).await;
    }
}
