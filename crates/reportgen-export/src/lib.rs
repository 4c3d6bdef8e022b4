//! reportgen-export
//!
//! Template-driven report artifacts: renders the report file and the email
//! that announces it.

pub mod error;
pub mod generator;
pub mod render;

pub use crate::generator::{TemplateGenerator, TemplateGeneratorConfig, TemplateSource};
