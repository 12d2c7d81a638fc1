//! Controlled-section merge
//!
//! For every controlled tag the patch is authoritative:
//! - the i-th patch occurrence replaces the i-th original occurrence, or is
//!   appended to the original root when the original has fewer;
//! - a tag missing from the patch is removed from the original entirely.
//!
//! Original occurrences beyond the patch count are left in place. Nested
//! occurrences move with their outermost matching ancestor.

use thiserror::Error;
use tracing::debug;

use super::tree::{XmlDocument, XmlNode};

/// Errors raised while merging configurations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The original configuration or the patch is not well-formed XML.
    #[error("failed to parse XML: {0}")]
    ParseFailed(String),
}

/// Stateless merger of patch fragments into remote configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlPatchMerger;

impl XmlPatchMerger {
    /// Create a merger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Merge `patch_xml` into `original_xml`, touching only `controlled_tags`.
    ///
    /// `patch_xml` must be a well-formed document; fragments are wrapped in
    /// a synthetic root by the caller before merging.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::ParseFailed`] if either document fails to parse.
    pub fn merge(
        &self,
        original_xml: &str,
        patch_xml: &str,
        controlled_tags: &[&str],
    ) -> Result<String, MergeError> {
        let mut original = XmlDocument::parse(original_xml)?;
        let patch = XmlDocument::parse(patch_xml)?;

        for tag in controlled_tags {
            let patch_nodes: Vec<XmlNode> = patch
                .root
                .find_paths(tag)
                .iter()
                .filter_map(|path| patch.root.element_at(path))
                .map(|element| XmlNode::Element(element.clone()))
                .collect();
            let original_paths = original.root.find_paths(tag);

            debug!(
                tag,
                patch_count = patch_nodes.len(),
                original_count = original_paths.len(),
                "merging controlled tag"
            );

            if patch_nodes.is_empty() {
                // Paths are outermost-only, so removing back to front keeps
                // the remaining indices valid.
                for path in original_paths.iter().rev() {
                    original.root.remove_at(path);
                }
                continue;
            }

            for (index, node) in patch_nodes.into_iter().enumerate() {
                match original_paths.get(index) {
                    Some(path) => {
                        original.root.replace_at(path, node);
                    }
                    None => original.root.children.push(node),
                }
            }
        }

        Ok(original.to_xml())
    }
}
