//! Tinypack Engine
//!
//! This crate bundles a graph of JavaScript modules into one artifact:
//! - **Parser**: Lexer and top-level statement parser (`parser` module)
//! - **Transform**: Import/export rewriting and dependency extraction (`transform` module)
//! - **Module**: Path resolution, graph discovery and caching (`module` module)
//! - **Codegen**: Printing, wrapper emission and artifact output (`codegen` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use tinypack_engine::{BundleConfig, Bundler};
//!
//! let config = BundleConfig {
//!     entry: "src/index.js".into(),
//!     ..BundleConfig::default()
//! };
//! let report = Bundler::new(config).bundle()?;
//! println!("Bundled {} modules", report.modules.len());
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Parser module: Lexer, syntax tree, and statement parser
pub mod parser;

/// Transform module: Rewriting and dependency extraction
pub mod transform;

/// Module resolution: Resolver, graph, cache, and graph walk
pub mod module;

/// Codegen module: Printer, emitter, and artifact writer
pub mod codegen;

pub mod bundler;
pub mod config;
pub mod error;

// ============================================================================
// Re-exports
// ============================================================================

pub use bundler::{BundleReport, Bundler};
pub use codegen::{ArtifactWriter, EmitOrder, FsWriter, WriteError};
pub use config::{BundleConfig, ConfigError, ConfigFile, CONFIG_FILE_NAME};
pub use error::BundleError;
pub use module::{
    Diagnostic, FsLoader, LoadError, ModuleGraph, ModuleResolver, Resolution, Severity,
    SourceLoader,
};
pub use parser::{parse_module, SyntaxError};
pub use transform::{extract_dependencies, transform_module, TransformSummary};
