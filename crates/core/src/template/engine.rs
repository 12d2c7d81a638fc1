//! Template registry and rendering entry point

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use jobsync_domain::constants::{
    FREESTYLE_CONFIG_TEMPLATE, FREESTYLE_PATCH_TEMPLATE, PIPELINE_CONFIG_TEMPLATE,
    PIPELINE_PATCH_TEMPLATE, PIPELINE_SCRIPT_TEMPLATE,
};
use jobsync_domain::TemplateConfig;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::parser::CompiledTemplate;

const TEMPLATE_EXTENSION: &str = "mustache";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (FREESTYLE_CONFIG_TEMPLATE, include_str!("../../templates/freestyle_config.mustache")),
    (FREESTYLE_PATCH_TEMPLATE, include_str!("../../templates/freestyle_patch.mustache")),
    (PIPELINE_CONFIG_TEMPLATE, include_str!("../../templates/pipeline_config.mustache")),
    (PIPELINE_PATCH_TEMPLATE, include_str!("../../templates/pipeline_patch.mustache")),
    (PIPELINE_SCRIPT_TEMPLATE, include_str!("../../templates/pipeline_script.mustache")),
];

/// Errors raised while loading or rendering templates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// No template is registered under `name`.
    #[error("template '{name}' not found")]
    NotFound { name: String },

    /// The template failed to compile, or a lookup found no value.
    #[error("failed to render template '{template}': {reason}")]
    RenderFailed { template: String, reason: String },

    /// The override directory or one of its files could not be read.
    #[error("failed to load templates from {path}: {reason}")]
    Load { path: String, reason: String },
}

/// Immutable set of compiled templates shared across requests.
#[derive(Debug, Clone, Default)]
pub struct ConfigTemplateEngine {
    templates: HashMap<String, CompiledTemplate>,
}

impl ConfigTemplateEngine {
    /// Engine with no templates registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the compiled-in job and script templates.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::RenderFailed`] if a built-in template does
    /// not compile.
    pub fn with_builtin() -> Result<Self, TemplateError> {
        let mut engine = Self::new();
        for (name, source) in BUILTIN_TEMPLATES {
            engine.register(name, source)?;
        }
        Ok(engine)
    }

    /// Built-in templates, overridden by any `*.mustache` files in the
    /// configured directory.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Load`] if the directory cannot be read and
    /// [`TemplateError::RenderFailed`] if an override does not compile.
    pub fn from_config(config: &TemplateConfig) -> Result<Self, TemplateError> {
        let mut engine = Self::with_builtin()?;
        if let Some(dir) = &config.dir {
            let loaded = engine.load_dir(Path::new(dir))?;
            info!(templates_dir = %dir, loaded, "loaded template overrides");
        }
        Ok(engine)
    }

    /// Compile every `<name>.mustache` file in `dir`, replacing templates of
    /// the same name. Returns how many were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, TemplateError> {
        let load_error = |reason: String| TemplateError::Load {
            path: dir.display().to_string(),
            reason,
        };

        let entries = fs::read_dir(dir).map_err(|e| load_error(e.to_string()))?;
        let mut loaded = 0;

        for entry in entries {
            let path = entry.map_err(|e| load_error(e.to_string()))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let source = fs::read_to_string(&path).map_err(|e| load_error(e.to_string()))?;
            self.register(name, &source)?;
            debug!(template = name, path = %path.display(), "template override registered");
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Compile and register `source` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::RenderFailed`] when `source` does not compile.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        let compiled = CompiledTemplate::compile(name, source)?;
        self.templates.insert(name.to_string(), compiled);
        Ok(())
    }

    /// Whether a template named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Render `name` against `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::NotFound`] for an unknown name and
    /// [`TemplateError::RenderFailed`] when a referenced key is missing.
    pub fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound { name: name.to_string() })?;
        template.render(context)
    }
}
