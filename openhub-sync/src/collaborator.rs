//! Narrow interfaces between the synchronization core and the outside world.

use async_trait::async_trait;

use openhub_core::{Listener, Revision};
use openhub_remote::{Artifacts, RemoteError};

/// Answers "did the watched package build?" and "at which revision?".
///
/// Implementations log transport and decoding failures themselves and surface
/// them as "not succeeded" / `None`; the core never sees why.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn is_succeeded(&self, listener: &Listener) -> bool;

    /// `None` when the revision is unknown or could not be fetched.
    async fn current_revision(&self, listener: &Listener) -> Option<Revision>;
}

/// Performs the downstream effect for a listener.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Download the image tarball and its checksum sidecar.
    async fn fetch_artifacts(&self, listener: &Listener) -> Result<Artifacts, RemoteError>;

    /// Verify the tarball, drop stale local images and load the new one.
    async fn verify_and_load(
        &self,
        listener: &Listener,
        artifacts: &Artifacts,
    ) -> Result<(), RemoteError>;

    async fn push(&self, listener: &Listener) -> Result<(), RemoteError>;

    /// One registry webhook call.
    async fn trigger_tag(&self, repository: &str, tag: &str) -> Result<(), RemoteError>;

    /// Remove whatever `fetch_artifacts` left on disk.
    async fn discard_artifacts(&self, listener: &Listener) {
        let _ = listener;
    }
}
