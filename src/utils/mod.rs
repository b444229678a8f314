//! Validation helpers and tool settings.

pub mod settings;
pub mod validation;
