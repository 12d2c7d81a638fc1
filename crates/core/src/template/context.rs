//! Render contexts built from job fields

use jobsync_domain::constants::{DEFAULT_BRANCH, PATCH_ROOT};
use jobsync_domain::JobSpec;
use serde_json::{json, Value};

/// Context consumed by the built-in job templates.
///
/// Optional fields are always present so strict lookups never fail on a
/// job that simply has no repository configured.
#[must_use]
pub fn job_context(spec: &JobSpec) -> Value {
    let repository_url = spec.repository_url.as_deref().map(str::trim).unwrap_or_default();
    let branch = spec
        .branch
        .as_deref()
        .map(str::trim)
        .filter(|branch| !branch.is_empty())
        .unwrap_or(DEFAULT_BRANCH);

    json!({
        "description": spec.description,
        "projectUrl": spec.project_url,
        "projectDisplayName": spec.project_display_name,
        "githubTrigger": spec.github_trigger,
        "hasScm": !repository_url.is_empty(),
        "repositoryUrl": repository_url,
        "branch": branch,
        "script": spec.script,
    })
}

/// Wrap a rendered patch fragment in a synthetic root so it parses as a
/// single document.
#[must_use]
pub fn wrap_patch(fragment: &str) -> String {
    format!("<{PATCH_ROOT}>\n{fragment}\n</{PATCH_ROOT}>")
}
