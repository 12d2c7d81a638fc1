//! Stage name extraction for declarative pipeline scripts
//!
//! # Example
//!
//! ```rust
//! use jobsync_domain::utils::stage_extractor::extract_stage_names;
//!
//! let script = r#"
//! pipeline {
//!     stages {
//!         stage('Build') { steps { sh 'make' } }
//!         stage("Test") { steps { sh 'make test' } }
//!     }
//! }"#;
//!
//! assert_eq!(extract_stage_names(script), vec!["Build", "Test"]);
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static STAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"stage\s*\(\s*['"]([^'"]+)['"]\s*\)\s*\{"#).expect("stage pattern is valid")
});

/// Distinct stage names in order of first appearance.
#[must_use]
pub fn extract_stage_names(script: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    STAGE_PATTERN
        .captures_iter(script)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
