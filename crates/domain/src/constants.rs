//! Application constants
//!
//! Centralized location for domain-level constants shared by the template,
//! merge and sync layers.

use crate::types::JobKind;

// Configuration defaults
pub const DEFAULT_DB_PATH: &str = "jobsync.db";
pub const DEFAULT_POOL_SIZE: u32 = 8;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("jobsync/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

// Template names
pub const FREESTYLE_CONFIG_TEMPLATE: &str = "freestyle_config";
pub const FREESTYLE_PATCH_TEMPLATE: &str = "freestyle_patch";
pub const PIPELINE_CONFIG_TEMPLATE: &str = "pipeline_config";
pub const PIPELINE_PATCH_TEMPLATE: &str = "pipeline_patch";
pub const PIPELINE_SCRIPT_TEMPLATE: &str = "pipeline_script";

// Root element wrapped around rendered patch fragments
pub const PATCH_ROOT: &str = "patch";

// Branch specifier used when a freestyle job names none
pub const DEFAULT_BRANCH: &str = "*/main";

// Branch checked out by generated pipeline scripts when none is requested
pub const DEFAULT_SCRIPT_BRANCH: &str = "main";

// Controlled tags: sections the merger owns outright
pub const TAG_DESCRIPTION: &str = "description";
pub const TAG_GITHUB_PROJECT: &str = "com.coravy.hudson.plugins.github.GithubProjectProperty";
pub const TAG_SCM: &str = "scm";
pub const TAG_GITHUB_PUSH_TRIGGER: &str = "com.cloudbees.jenkins.GitHubPushTrigger";
pub const TAG_SHELL_STEP: &str = "hudson.tasks.Shell";
pub const TAG_PIPELINE_DEFINITION: &str = "definition";

pub const FREESTYLE_CONTROLLED_TAGS: &[&str] =
    &[TAG_DESCRIPTION, TAG_GITHUB_PROJECT, TAG_SCM, TAG_GITHUB_PUSH_TRIGGER, TAG_SHELL_STEP];

pub const PIPELINE_CONTROLLED_TAGS: &[&str] =
    &[TAG_DESCRIPTION, TAG_GITHUB_PROJECT, TAG_GITHUB_PUSH_TRIGGER, TAG_PIPELINE_DEFINITION];

impl JobKind {
    /// Template rendering a full configuration for a new job.
    #[must_use]
    pub const fn config_template(self) -> &'static str {
        match self {
            Self::Freestyle => FREESTYLE_CONFIG_TEMPLATE,
            Self::Pipeline => PIPELINE_CONFIG_TEMPLATE,
        }
    }

    /// Template rendering the controlled-section fragment for an update.
    #[must_use]
    pub const fn patch_template(self) -> &'static str {
        match self {
            Self::Freestyle => FREESTYLE_PATCH_TEMPLATE,
            Self::Pipeline => PIPELINE_PATCH_TEMPLATE,
        }
    }

    /// Tags the merger replaces or removes for this kind of job.
    #[must_use]
    pub const fn controlled_tags(self) -> &'static [&'static str] {
        match self {
            Self::Freestyle => FREESTYLE_CONTROLLED_TAGS,
            Self::Pipeline => PIPELINE_CONTROLLED_TAGS,
        }
    }
}
