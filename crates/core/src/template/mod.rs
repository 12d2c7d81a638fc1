//! Logic-less templates rendering job configurations

pub mod context;
pub mod engine;
pub mod parser;

pub use context::{job_context, wrap_patch};
pub use engine::{ConfigTemplateEngine, TemplateError};
pub use parser::CompiledTemplate;
