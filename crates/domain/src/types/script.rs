//! Pipeline script generation types

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SCRIPT_BRANCH;
use crate::errors::{JobSyncError, Result};
use crate::impl_domain_status_conversions;

/// Build system detected in a source repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTool {
    Gradle,
    /// Maven project that ships the `mvnw` wrapper.
    MavenWrapper,
    Maven,
    Sbt,
    Bazel,
    Ant,
    /// Nothing recognisable; the generated script only checks out sources.
    Unknown,
}

impl_domain_status_conversions!(BuildTool {
    Gradle => "gradle",
    MavenWrapper => "maven_wrapper",
    Maven => "maven",
    Sbt => "sbt",
    Bazel => "bazel",
    Ant => "ant",
    Unknown => "unknown",
});

impl BuildTool {
    /// Every variant, in detection priority order.
    pub const ALL: [BuildTool; 7] = [
        Self::Gradle,
        Self::MavenWrapper,
        Self::Maven,
        Self::Sbt,
        Self::Bazel,
        Self::Ant,
        Self::Unknown,
    ];
}

/// Build tool plus the repository directory its build file lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLayout {
    pub tool: BuildTool,
    /// Relative directory, `.` for the repository root.
    pub directory: String,
}

impl Default for BuildLayout {
    fn default() -> Self {
        Self { tool: BuildTool::Unknown, directory: ".".to_string() }
    }
}

/// Request for a generated declarative pipeline script.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScriptRequest {
    /// GitHub repository to check out, e.g. `https://github.com/acme/app.git`.
    pub repository_url: String,
    /// Branch to check out; `main` when absent.
    pub branch: Option<String>,
    /// Emit a build stage.
    pub build: bool,
    /// Emit a test stage.
    pub test: bool,
}

impl ScriptRequest {
    /// Requested branch, or [`DEFAULT_SCRIPT_BRANCH`] when none was given.
    #[must_use]
    pub fn branch_or_default(&self) -> &str {
        self.branch
            .as_deref()
            .map(str::trim)
            .filter(|branch| !branch.is_empty())
            .unwrap_or(DEFAULT_SCRIPT_BRANCH)
    }

    /// Reject values that cannot be embedded in a single-quoted Groovy string.
    ///
    /// # Errors
    ///
    /// Returns [`JobSyncError::InvalidInput`] for an empty repository URL or
    /// a URL or branch containing quotes, backslashes or line breaks.
    pub fn validate(&self) -> Result<()> {
        if self.repository_url.trim().is_empty() {
            return Err(JobSyncError::InvalidInput("repository URL must not be empty".into()));
        }
        let fields =
            [("repository URL", self.repository_url.as_str()), ("branch", self.branch_or_default())];
        for (field, value) in fields {
            if value.contains(['\'', '\\', '\n', '\r']) {
                return Err(JobSyncError::InvalidInput(format!(
                    "{field} contains characters not allowed in a pipeline script"
                )));
            }
        }
        Ok(())
    }
}
