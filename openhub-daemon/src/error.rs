use thiserror::Error;

/// Fatal errors: anything that stops the scheduler from ever running a pass.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to build the async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("remote client setup failed: {0}")]
    Remote(#[from] openhub_remote::RemoteError),

    #[error("synchronization interval must be greater than zero")]
    ZeroInterval,

    #[error("ctrl-c handler failed: {0}")]
    Signal(#[source] std::io::Error),
}
