//! Error types for openhub-remote.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while talking to the build service, the registry
/// or the local container engine.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport failure, including request timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body was not the expected XML document.
    #[error("malformed XML response: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The binary listing lacked the tarball or its checksum file.
    #[error("package '{package}' does not publish a {kind}")]
    MissingArtifact { package: String, kind: &'static str },

    /// A published file name that would land outside the download directory.
    #[error("refusing to download '{filename}': not a plain file name")]
    UnsafeFilename { filename: String },

    /// The checksum file holds no SHA-256 digest.
    #[error("no SHA-256 digest found in {path}")]
    InvalidChecksum { path: PathBuf },

    /// The tarball digest differs from the published one.
    #[error("'{tarball}' does not match sha256 file '{checksum}' (expected {expected}, got {actual})")]
    ChecksumMismatch {
        tarball: PathBuf,
        checksum: PathBuf,
        expected: String,
        actual: String,
    },

    /// The container engine exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    Engine {
        command: String,
        status: String,
        stderr: String,
    },

    /// A blocking helper task could not be joined.
    #[error("background task failed: {0}")]
    Join(String),
}

impl RemoteError {
    /// True for transport timeouts; used to word log lines.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Http(err) if err.is_timeout())
    }
}

/// Convenience constructor for [`RemoteError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RemoteError {
    RemoteError::Io {
        path: path.into(),
        source,
    }
}
