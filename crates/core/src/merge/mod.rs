//! Controlled-section merging of remote job configurations

pub mod merger;
pub mod tree;

pub use merger::{MergeError, XmlPatchMerger};
