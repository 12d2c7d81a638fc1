//! Fixed repository listing

use std::sync::Mutex;

use async_trait::async_trait;
use jobsync_core::{GithubRepository, RepositoryInspector};
use jobsync_domain::{JobSyncError, Result};

/// Answers every lookup with the same file list, or the same error.
pub struct StaticInspector {
    files: std::result::Result<Vec<String>, JobSyncError>,
    seen: Mutex<Vec<GithubRepository>>,
}

impl StaticInspector {
    pub fn with_files(files: &[&str]) -> Self {
        Self { files: Ok(files.iter().map(|f| (*f).to_string()).collect()), seen: Mutex::default() }
    }

    pub fn failing(err: JobSyncError) -> Self {
        Self { files: Err(err), seen: Mutex::default() }
    }

    /// Repositories looked up so far.
    pub fn seen(&self) -> Vec<GithubRepository> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositoryInspector for StaticInspector {
    async fn list_files(&self, repository: &GithubRepository) -> Result<Vec<String>> {
        self.seen.lock().unwrap().push(repository.clone());
        self.files.clone()
    }
}
