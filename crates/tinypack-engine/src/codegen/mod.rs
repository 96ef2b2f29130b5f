//! Code generation
//!
//! - Printing syntax trees back to source
//! - Rendering resolved modules into one bundle
//! - Writing the bundle artifact

pub mod emit;
pub mod printer;
pub mod writer;

pub use emit::{emit_bundle, render_wrapper, EmitOrder, EmittedBundle};
pub use printer::{print_module, PrintSource};
pub use writer::{ArtifactWriter, FsWriter, WriteError};
