//! Registry build-trigger webhook.

use std::time::Duration;

use serde_json::json;

use openhub_core::Credentials;

use crate::error::RemoteError;

#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    server: String,
}

impl HubClient {
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            server: credentials.hub_server.trim_end_matches('/').to_string(),
        })
    }

    /// `{server}/u/{repository}/trigger/{token}/`
    pub fn trigger_url(&self, repository: &str, token: &str) -> String {
        format!("{}/u/{}/trigger/{}/", self.server, repository, token)
    }

    /// Ask the registry to rebuild `repository:tag`.
    pub async fn trigger_tag(
        &self,
        token: &str,
        repository: &str,
        tag: &str,
    ) -> Result<(), RemoteError> {
        let url = self.trigger_url(repository, token);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "docker_tag": tag }))
            .send()
            .await
            // The token is part of the path; keep it out of error messages.
            .map_err(|err| RemoteError::Http(err.without_url()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                tag,
                repository,
                body = %body,
                "registry rejected trigger"
            );
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url: self.trigger_url(repository, "<token>"),
            });
        }
        Ok(())
    }
}
