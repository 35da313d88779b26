//! Build-service client.
//!
//! Every request is a basic-authenticated `GET` on
//! `{server}/build/{project}/{distribution}/{architecture}/{package}[/{suffix}]`
//! bounded by the configured request timeout.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;

use openhub_core::{Credentials, Listener, Revision};

use crate::error::{io_err, RemoteError};
use crate::xml::{self, BinaryListDoc, BuildInfoDoc, StatusDoc};

/// Result code the build service reports for a finished, successful build.
const SUCCEEDED: &str = "succeeded";

/// Build status as reported by `_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildState {
    Succeeded,
    /// Anything else (`building`, `failed`, `scheduled`, ...), verbatim.
    Other(String),
}

impl BuildState {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, BuildState::Succeeded)
    }
}

#[derive(Clone)]
pub struct ObsClient {
    http: reqwest::Client,
    server: String,
    user: String,
    password: String,
}

impl fmt::Debug for ObsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObsClient")
            .field("server", &self.server)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl ObsClient {
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            server: credentials.server.trim_end_matches('/').to_string(),
            user: credentials.user.clone(),
            password: credentials.password.clone(),
        })
    }

    /// Full URL for `listener`'s package, optionally followed by `suffix`.
    pub fn endpoint(&self, listener: &Listener, suffix: Option<&str>) -> String {
        let mut url = format!(
            "{}/build/{}/{}/{}/{}",
            self.server,
            listener.project,
            listener.distribution,
            listener.architecture,
            listener.package
        );
        if let Some(suffix) = suffix {
            url.push('/');
            url.push_str(suffix);
        }
        url
    }

    async fn get(
        &self,
        listener: &Listener,
        suffix: Option<&str>,
    ) -> Result<reqwest::Response, RemoteError> {
        let url = self.endpoint(listener, suffix);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(RemoteError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(response)
    }

    /// `_status` of the listener's package.
    pub async fn build_state(&self, listener: &Listener) -> Result<BuildState, RemoteError> {
        let body = self.get(listener, Some("_status")).await?.text().await?;
        let doc: StatusDoc = xml::decode(&body)?;
        if doc.code == SUCCEEDED {
            Ok(BuildState::Succeeded)
        } else {
            Ok(BuildState::Other(doc.code))
        }
    }

    /// Revision from `_buildinfo`. `None` when the document has no usable `<rev>`.
    pub async fn revision(&self, listener: &Listener) -> Result<Option<Revision>, RemoteError> {
        let body = self.get(listener, Some("_buildinfo")).await?.text().await?;
        let doc: BuildInfoDoc = xml::decode(&body)?;
        Ok(doc
            .rev
            .map(|rev| Revision::from(rev.trim()))
            .filter(|rev| !rev.is_empty()))
    }

    /// File names published for the listener's package.
    pub async fn binaries(&self, listener: &Listener) -> Result<Vec<String>, RemoteError> {
        let body = self.get(listener, None).await?.text().await?;
        let doc: BinaryListDoc = xml::decode(&body)?;
        Ok(doc.binaries.into_iter().map(|b| b.filename).collect())
    }

    /// Stream one published file into `dir`, returning the written path.
    ///
    /// `filename` comes from the server's listing and must be a single path
    /// component.
    pub async fn download(
        &self,
        listener: &Listener,
        filename: &str,
        dir: &Path,
    ) -> Result<PathBuf, RemoteError> {
        if Path::new(filename).file_name().and_then(|name| name.to_str()) != Some(filename) {
            return Err(RemoteError::UnsafeFilename {
                filename: filename.to_string(),
            });
        }
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| io_err(dir, e))?;
        let dst = dir.join(filename);
        tracing::info!(file = filename, dir = %dir.display(), "downloading build artifact");

        let mut response = self.get(listener, Some(filename)).await?;
        let mut out = tokio::fs::File::create(&dst)
            .await
            .map_err(|e| io_err(&dst, e))?;
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk).await.map_err(|e| io_err(&dst, e))?;
        }
        out.flush().await.map_err(|e| io_err(&dst, e))?;
        Ok(dst)
    }
}
