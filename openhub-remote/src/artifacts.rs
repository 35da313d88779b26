//! Image tarball download and SHA-256 verification.

use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use openhub_core::Listener;

use crate::error::{io_err, RemoteError};
use crate::obs::ObsClient;

const TARBALL_SUFFIX: &str = ".docker.tar";
const CHECKSUM_SUFFIX: &str = ".docker.tar.sha256";

/// A downloaded image tarball and its checksum sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub tarball: PathBuf,
    pub checksum: PathBuf,
}

/// Pick the tarball and checksum names out of a binary listing.
pub fn select(package: &str, filenames: &[String]) -> Result<(String, String), RemoteError> {
    let tarball = filenames
        .iter()
        .find(|name| name.ends_with(TARBALL_SUFFIX))
        .ok_or_else(|| RemoteError::MissingArtifact {
            package: package.to_string(),
            kind: "image tarball",
        })?;
    let checksum = filenames
        .iter()
        .find(|name| name.ends_with(CHECKSUM_SUFFIX))
        .ok_or_else(|| RemoteError::MissingArtifact {
            package: package.to_string(),
            kind: "sha256 file",
        })?;
    Ok((tarball.clone(), checksum.clone()))
}

/// Scratch directory for one listener below `root`.
pub fn listener_dir(root: &Path, listener: &Listener) -> PathBuf {
    root.join(&listener.name.0)
}

/// Download the tarball and its checksum for `listener` into `root/<name>/`.
pub async fn fetch(
    obs: &ObsClient,
    listener: &Listener,
    root: &Path,
) -> Result<Artifacts, RemoteError> {
    let filenames = obs.binaries(listener).await?;
    let (tarball, checksum) = select(&listener.package, &filenames)?;
    let dir = listener_dir(root, listener);
    Ok(Artifacts {
        tarball: obs.download(listener, &tarball, &dir).await?,
        checksum: obs.download(listener, &checksum, &dir).await?,
    })
}

/// Remove a listener's scratch directory. Missing directories are fine.
pub async fn discard(root: &Path, listener: &Listener) {
    let dir = listener_dir(root, listener);
    match tokio::fs::remove_dir_all(&dir).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(dir = %dir.display(), error = %err, "could not remove downloaded artifacts");
        }
    }
}

/// First 64-hex-digit token in `contents`, lowercased.
///
/// Handles bare digests, `sha256sum` output and clearsigned files alike.
pub fn parse_digest(contents: &str) -> Option<String> {
    contents
        .split(|c: char| !c.is_ascii_hexdigit())
        .find(|token| token.len() == 64)
        .map(|token| token.to_ascii_lowercase())
}

/// Hex SHA-256 of the file at `path`.
pub fn sha256_file(path: &Path) -> Result<String, RemoteError> {
    let mut file = std::fs::File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(|e| io_err(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Check the tarball against its sidecar.
pub fn verify_blocking(artifacts: &Artifacts) -> Result<(), RemoteError> {
    let contents =
        std::fs::read_to_string(&artifacts.checksum).map_err(|e| io_err(&artifacts.checksum, e))?;
    let expected = parse_digest(&contents).ok_or_else(|| RemoteError::InvalidChecksum {
        path: artifacts.checksum.clone(),
    })?;
    let actual = sha256_file(&artifacts.tarball)?;
    if actual != expected {
        return Err(RemoteError::ChecksumMismatch {
            tarball: artifacts.tarball.clone(),
            checksum: artifacts.checksum.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// [`verify_blocking`] off the async worker threads.
pub async fn verify(artifacts: &Artifacts) -> Result<(), RemoteError> {
    let artifacts = artifacts.clone();
    tokio::task::spawn_blocking(move || verify_blocking(&artifacts))
        .await
        .map_err(|err| RemoteError::Join(format!("checksum task join error: {err}")))?
}
