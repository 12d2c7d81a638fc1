//! Port interfaces for source repository inspection

use async_trait::async_trait;
use jobsync_domain::{JobSyncError, Result};
use url::Url;

const GITHUB_HOST: &str = "github.com";

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GithubRepository {
    pub owner: String,
    pub name: String,
}

impl GithubRepository {
    /// Parse a `https://github.com/{owner}/{repo}[.git]` URL.
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::InvalidInput`] when the URL does not parse,
    /// is not hosted on github.com or lacks an owner and repository segment.
    pub fn parse(repository_url: &str) -> Result<Self> {
        let url = Url::parse(repository_url.trim())
            .map_err(|e| JobSyncError::InvalidInput(format!("invalid repository URL: {e}")))?;
        if url.host_str() != Some(GITHUB_HOST) {
            return Err(JobSyncError::InvalidInput(format!(
                "repository must be hosted on {GITHUB_HOST}, got '{}'",
                url.host_str().unwrap_or_default()
            )));
        }

        let mut segments = url.path_segments().into_iter().flatten().filter(|s| !s.is_empty());
        match (segments.next(), segments.next(), segments.next()) {
            (Some(owner), Some(name), None) => {
                let name = name.strip_suffix(".git").unwrap_or(name);
                if name.is_empty() {
                    return Err(JobSyncError::InvalidInput("repository name is empty".into()));
                }
                Ok(Self { owner: owner.to_string(), name: name.to_string() })
            }
            _ => Err(JobSyncError::InvalidInput(format!(
                "expected https://{GITHUB_HOST}/<owner>/<repo>, got '{repository_url}'"
            ))),
        }
    }

    /// `owner/name`, the form the GitHub API uses in paths.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Lists the files of a hosted source repository.
#[async_trait]
pub trait RepositoryInspector: Send + Sync {
    /// Slash-separated paths of every file on the repository's default branch.
    async fn list_files(&self, repository: &GithubRepository) -> Result<Vec<String>>;
}
