//! Module resolution
//!
//! This module provides bundling support with:
//! - Relative import resolution (`./path`, `../path`)
//! - Module dependency graph construction in discovery order
//! - Cycle detection
//! - Transformed-source caching

mod cache;
mod graph;
mod graph_resolver;
mod loader;
mod resolver;

pub use cache::{ModuleCache, ModuleState};
pub use graph::ModuleGraph;
pub use graph_resolver::{Diagnostic, GraphResolver, Resolution, Severity};
pub use loader::{FsLoader, LoadError, SourceLoader};
pub use resolver::{is_relative, normalize, ModuleResolver, ResolveError, DEFAULT_EXTENSION};
