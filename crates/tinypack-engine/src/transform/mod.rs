//! Module syntax transformation
//!
//! - Rewriting default imports and default exports into runtime load calls
//! - Extracting the specifiers a transformed module depends on

mod deps;
mod rewriter;

pub use deps::extract_dependencies;
pub use rewriter::{transform_module, ImportForm, TransformSummary, UnsupportedImport};
