//! GitHub REST implementation of [`RepositoryInspector`]

use async_trait::async_trait;
use jobsync_core::{GithubRepository, RepositoryInspector};
use jobsync_domain::{GithubConfig, JobSyncError, RemoteConfig, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use zeroize::Zeroizing;

use crate::http::HttpClient;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct GitTree {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Lists repository files through the GitHub trees API.
///
/// Looks up the default branch first, then fetches its tree recursively.
pub struct GithubRepositoryInspector {
    http: HttpClient,
    api_url: String,
    token: Option<Zeroizing<String>>,
}

impl GithubRepositoryInspector {
    /// Inspector calling the API at `api_url`, authenticating with `token`
    /// when one is given.
    #[must_use]
    pub fn new(http: HttpClient, api_url: &str, token: Option<Zeroizing<String>>) -> Self {
        Self { http, api_url: api_url.trim_end_matches('/').to_string(), token }
    }

    /// Inspector using the `[github]` settings and the `[remote]` timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(github: &GithubConfig, remote: &RemoteConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::from_config(remote)?, &github.api_url, github.token.clone()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let mut request = self.http.request(Method::GET, url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.as_str()));
        }

        let response = self.http.send(request).await.map_err(|e| JobSyncError::Network(e.to_string()))?;
        let body = read_success(response, what).await?;
        serde_json::from_str(&body)
            .map_err(|e| JobSyncError::Network(format!("unexpected GitHub response for {what}: {e}")))
    }
}

#[async_trait]
impl RepositoryInspector for GithubRepositoryInspector {
    #[instrument(skip(self, repository), fields(repository = %repository.full_name()))]
    async fn list_files(&self, repository: &GithubRepository) -> Result<Vec<String>> {
        let full_name = repository.full_name();
        let info: RepositoryInfo =
            self.get_json(&format!("{}/repos/{full_name}", self.api_url), &full_name).await?;

        let tree: GitTree = self
            .get_json(
                &format!(
                    "{}/repos/{full_name}/git/trees/{}?recursive=1",
                    self.api_url, info.default_branch
                ),
                &format!("{full_name}@{}", info.default_branch),
            )
            .await?;
        if tree.truncated {
            warn!(branch = %info.default_branch, "GitHub truncated the tree listing");
        }

        let files: Vec<String> =
            tree.tree.into_iter().filter(|entry| entry.kind == "blob").map(|entry| entry.path).collect();
        debug!(branch = %info.default_branch, files = files.len(), "repository tree listed");
        Ok(files)
    }
}

async fn read_success(response: Response, what: &str) -> Result<String> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(JobSyncError::NotFound(format!("GitHub repository {what}")));
    }
    if !status.is_success() {
        return Err(JobSyncError::Network(format!("GitHub returned {status} for {what}")));
    }
    response
        .text()
        .await
        .map_err(|e| JobSyncError::Network(format!("failed to read GitHub response for {what}: {e}")))
}
