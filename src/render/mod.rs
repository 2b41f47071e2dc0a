//! Diagram rendering
//!
//! Adds one diagram per class to the model document and drives the external
//! tools that turn the model's diagrams into PDF images.

mod export;
mod xmi;

pub use export::export_images;
pub use xmi::inject_single_class_diagrams;
