//! Pure helpers over job definitions

pub mod build_layout;
pub mod stage_extractor;
