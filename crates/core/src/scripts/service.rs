//! Pipeline script service

use std::sync::Arc;

use jobsync_domain::constants::PIPELINE_SCRIPT_TEMPLATE;
use jobsync_domain::{
    detect_build_layout, extract_stage_names, BuildLayout, BuildTool, JobSyncError, ScriptRequest,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use super::ports::{GithubRepository, RepositoryInspector};
use crate::template::{ConfigTemplateEngine, TemplateError};

/// Failure while generating a pipeline script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The request was invalid or the repository could not be inspected.
    #[error(transparent)]
    Domain(#[from] JobSyncError),

    /// The script template failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// A rendered script plus what was detected to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    pub script: String,
    pub layout: BuildLayout,
    /// Stage names in the order they appear in `script`.
    pub stages: Vec<String>,
}

/// Generates declarative pipeline scripts for GitHub repositories.
pub struct PipelineScriptService {
    inspector: Arc<dyn RepositoryInspector>,
    templates: Arc<ConfigTemplateEngine>,
}

impl PipelineScriptService {
    /// Service looking up files through `inspector` and rendering with `templates`.
    #[must_use]
    pub fn new(inspector: Arc<dyn RepositoryInspector>, templates: Arc<ConfigTemplateEngine>) -> Self {
        Self { inspector, templates }
    }

    /// Detect the repository's build tool and render a checkout, build and
    /// test pipeline for it. Build and test stages are emitted only when
    /// requested.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Domain`] for an invalid request or when the
    /// inspector fails, and [`ScriptError::Template`] when rendering fails.
    pub async fn generate(&self, request: &ScriptRequest) -> Result<GeneratedScript, ScriptError> {
        request.validate()?;
        let repository = GithubRepository::parse(&request.repository_url)?;

        let files = self.inspector.list_files(&repository).await?;
        let layout = detect_build_layout(&files);
        debug!(
            repository = %repository.full_name(),
            files = files.len(),
            tool = %layout.tool,
            directory = %layout.directory,
            "build layout detected"
        );

        let script = self.templates.render(PIPELINE_SCRIPT_TEMPLATE, &script_context(request, &layout))?;
        let stages = extract_stage_names(&script);

        info!(repository = %repository.full_name(), tool = %layout.tool, stages = stages.len(), "pipeline script generated");
        Ok(GeneratedScript { script, layout, stages })
    }
}

/// Template context for [`PIPELINE_SCRIPT_TEMPLATE`]. Every build tool gets a
/// boolean key so the template can branch on any of them.
#[must_use]
pub fn script_context(request: &ScriptRequest, layout: &BuildLayout) -> Value {
    let mut context = Map::new();
    context.insert("repositoryUrl".into(), Value::String(request.repository_url.trim().to_string()));
    context.insert("branch".into(), Value::String(request.branch_or_default().to_string()));
    context.insert("directory".into(), Value::String(layout.directory.clone()));
    context.insert("build".into(), Value::Bool(request.build));
    context.insert("test".into(), Value::Bool(request.test));
    for tool in BuildTool::ALL {
        context.insert(tool_key(tool).into(), Value::Bool(tool == layout.tool));
    }
    Value::Object(context)
}

const fn tool_key(tool: BuildTool) -> &'static str {
    match tool {
        BuildTool::Gradle => "gradle",
        BuildTool::MavenWrapper => "mavenWrapper",
        BuildTool::Maven => "maven",
        BuildTool::Sbt => "sbt",
        BuildTool::Bazel => "bazel",
        BuildTool::Ant => "ant",
        BuildTool::Unknown => "unknown",
    }
}
