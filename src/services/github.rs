//! Minimal GitHub REST client used for the release feed and the commit log.

use crate::models::{Branch, CommitInfo, NetworkSettings, ReleaseInfo};
use crate::services::release::ReleaseSource;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_settings(settings: &NetworkSettings) -> Result<Self> {
        Self::new(&settings.release_api_base, settings.github_token.clone())
    }

    /// GET `<api_base><path>` and decode JSON. `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!("GET {}", url);

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("{} returned 404", url);
            return Ok(None);
        }

        let body = response
            .error_for_status()
            .with_context(|| format!("GitHub API error for {}", url))?
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response of {}", url))?;

        Ok(Some(body))
    }

    /// Release tagged `tag` in `repo`; a missing release comes back with an empty tag.
    pub async fn release_by_tag(&self, repo: &str, tag: &str) -> Result<ReleaseInfo> {
        let path = format!("/repos/{}/releases/tags/{}", repo, tag);
        Ok(self.get_json::<ReleaseInfo>(&path).await?.unwrap_or_default())
    }

    /// Most recent commits of `repo`.
    pub async fn commits(&self, repo: &str) -> Result<Vec<CommitInfo>> {
        let path = format!("/repos/{}/commits", repo);
        Ok(self.get_json::<Vec<CommitInfo>>(&path).await?.unwrap_or_default())
    }
}

/// Release feed reading tagged releases of one GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubReleaseFeed {
    client: GitHubClient,
    repo: String,
}

impl GitHubReleaseFeed {
    pub fn new(client: GitHubClient, repo: impl Into<String>) -> Self {
        Self {
            client,
            repo: repo.into(),
        }
    }
}

impl ReleaseSource for GitHubReleaseFeed {
    async fn fetch_release(&self, version: &str, branch: Branch) -> Result<ReleaseInfo> {
        tracing::debug!("Fetching {} release {} from {}", branch, version, self.repo);
        self.client.release_by_tag(&self.repo, version).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let client = GitHubClient::new("https://api.github.com/", None).unwrap();
        assert_eq!(client.api_base, "https://api.github.com");
    }

    #[test]
    fn test_from_settings_uses_token() {
        let settings = NetworkSettings {
            github_token: Some("ghp_test".to_string()),
            ..NetworkSettings::default()
        };
        let client = GitHubClient::from_settings(&settings).unwrap();
        assert_eq!(client.token.as_deref(), Some("ghp_test"));
    }
}
