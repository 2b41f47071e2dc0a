//! umltex - Generate LaTeX documentation from Umbrello UML models
//!
//! Reads the model's logical view into an element graph and renders it as
//! LaTeX sections for modules, classes and diagrams. Every section can be
//! customized with override files.

pub mod cli;
pub mod config;
pub mod error;
pub mod latex;
pub mod model;
pub mod overrides;
pub mod render;
pub mod resolve;
pub mod template;

// Re-export main types
pub use config::Config;
pub use error::{Error, Result};
pub use latex::{generate_document, GenerateOptions};
pub use model::{parse_model, UmlModel};
pub use overrides::Overrides;
