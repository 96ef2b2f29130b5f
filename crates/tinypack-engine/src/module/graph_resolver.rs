//! Dependency graph discovery
//!
//! Walks the module graph depth-first from an entry module. Each module is
//! loaded, parsed, transformed and cached exactly once; relative
//! dependencies are followed, other specifiers are left to the runtime.
//!
//! The walk keeps an explicit stack of frames instead of recursing, so the
//! depth of the graph is not limited by the call stack. Modules are entered
//! in the same order as a recursive walk would enter them.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use tracing::{debug, error, warn};

use super::cache::ModuleCache;
use super::graph::ModuleGraph;
use super::loader::SourceLoader;
use super::resolver::{is_relative, ModuleResolver};
use crate::codegen::printer::print_module;
use crate::parser::parse_module;
use crate::transform::{extract_dependencies, transform_module, ImportForm};

/// A problem found while resolving one module
///
/// None of these stop the walk: the affected module is skipped or the
/// affected edge is not followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Source could not be read
    LoadFailed { path: PathBuf, message: String },

    /// Source could not be parsed
    ParseFailed {
        path: PathBuf,
        line: u32,
        column: u32,
        message: String,
    },

    /// A dependency edge closes a cycle
    ///
    /// The chain is the whole active resolution chain from the entry, followed
    /// by the module that was reached again.
    Cycle { chain: Vec<PathBuf> },

    /// An import form that is not rewritten was left as written
    UnsupportedImport {
        path: PathBuf,
        specifier: String,
        form: ImportForm,
        line: u32,
    },
}

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::LoadFailed { .. } | Diagnostic::ParseFailed { .. } => Severity::Error,
            Diagnostic::Cycle { .. } | Diagnostic::UnsupportedImport { .. } => Severity::Warning,
        }
    }

    /// The module the diagnostic is about
    pub fn path(&self) -> &Path {
        match self {
            Diagnostic::LoadFailed { path, .. }
            | Diagnostic::ParseFailed { path, .. }
            | Diagnostic::UnsupportedImport { path, .. } => path,
            Diagnostic::Cycle { chain } => chain.first().map(PathBuf::as_path).unwrap_or(Path::new("")),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LoadFailed { path, message } => {
                write!(f, "Failed to load module {}: {}", path.display(), message)
            }
            Diagnostic::ParseFailed {
                path,
                line,
                column,
                message,
            } => write!(
                f,
                "Failed to parse module {} at {}:{}: {}",
                path.display(),
                line,
                column,
                message
            ),
            Diagnostic::Cycle { chain } => {
                let chain: Vec<String> = chain.iter().map(|p| p.display().to_string()).collect();
                write!(f, "Circular dependency detected: {}", chain.join(" -> "))
            }
            Diagnostic::UnsupportedImport {
                path,
                specifier,
                form,
                line,
            } => write!(
                f,
                "{}:{}: {} of \"{}\" is not rewritten",
                path.display(),
                line,
                form.describe(),
                specifier
            ),
        }
    }
}

/// Everything learned from walking the graph
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Identity of the entry module
    pub entry: PathBuf,
    /// Modules in discovery order with their dependencies
    pub graph: ModuleGraph,
    /// Transformed source or failure of every visited module
    pub cache: ModuleCache,
    /// Problems found, in the order they were found
    pub diagnostics: Vec<Diagnostic>,
    /// Non-relative specifiers, in the order first seen
    pub externals: IndexSet<String>,
}

impl Resolution {
    /// Modules that could not be loaded or parsed, in discovery order
    pub fn unresolved(&self) -> Vec<PathBuf> {
        self.graph
            .modules()
            .filter(|path| self.cache.is_unresolved(path))
            .cloned()
            .collect()
    }
}

/// A module whose dependencies are being walked
struct Frame {
    path: PathBuf,
    dependencies: Vec<PathBuf>,
    next: usize,
}

/// Resolution state for one bundle run
///
/// Consumed by [`GraphResolver::resolve`]; every run starts from fresh state.
pub struct GraphResolver<'a, L: SourceLoader> {
    resolver: &'a ModuleResolver,
    loader: &'a mut L,
    visited: FxHashSet<PathBuf>,
    graph: ModuleGraph,
    cache: ModuleCache,
    diagnostics: Vec<Diagnostic>,
    externals: IndexSet<String>,
}

impl<'a, L: SourceLoader> GraphResolver<'a, L> {
    pub fn new(resolver: &'a ModuleResolver, loader: &'a mut L) -> Self {
        Self {
            resolver,
            loader,
            visited: FxHashSet::default(),
            graph: ModuleGraph::new(),
            cache: ModuleCache::new(),
            diagnostics: Vec::new(),
            externals: IndexSet::new(),
        }
    }

    /// Walk the graph from `entry`, taken relative to the base directory.
    pub fn resolve(mut self, entry: &Path) -> Resolution {
        let entry = self.resolver.resolve_entry(entry);

        // The active resolution chain
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.enter(entry.clone()) {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let Some(dependency) = frame.dependencies.get(frame.next).cloned() else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            self.graph.add_dependency(frame.path.clone(), dependency.clone());

            if stack.iter().any(|f| f.path == dependency) {
                let mut chain: Vec<PathBuf> = stack.iter().map(|f| f.path.clone()).collect();
                chain.push(dependency);
                self.report_cycle(chain);
                continue;
            }

            if let Some(frame) = self.enter(dependency) {
                stack.push(frame);
            }
        }

        Resolution {
            entry,
            graph: self.graph,
            cache: self.cache,
            diagnostics: self.diagnostics,
            externals: self.externals,
        }
    }

    /// Visit a module for the first time.
    ///
    /// Returns the frame to walk its dependencies, or `None` if the module
    /// was already visited or failed to resolve.
    fn enter(&mut self, path: PathBuf) -> Option<Frame> {
        if !self.visited.insert(path.clone()) {
            return None;
        }
        self.graph.add_module(path.clone());
        debug!("Resolving {}", self.resolver.display_path(&path));

        match self.process(&path) {
            Some((source, dependencies)) => {
                self.cache.insert_transformed(path.clone(), source);
                Some(Frame {
                    path,
                    dependencies,
                    next: 0,
                })
            }
            None => {
                self.cache.mark_unresolved(path);
                None
            }
        }
    }

    /// Load, parse and transform one module.
    ///
    /// Returns its transformed source and resolved relative dependencies.
    fn process(&mut self, path: &Path) -> Option<(String, Vec<PathBuf>)> {
        let name = self.resolver.display_path(path);

        let source = match self.loader.load(path) {
            Ok(source) => source,
            Err(err) => {
                error!("Failed to load module {}: {}", name, err);
                self.diagnostics.push(Diagnostic::LoadFailed {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                });
                return None;
            }
        };

        let mut module = match parse_module(&source) {
            Ok(module) => module,
            Err(err) => {
                let span = err.span().unwrap_or_default();
                error!(
                    "Failed to parse module {} at {}:{}: {}",
                    name, span.line, span.column, err
                );
                self.diagnostics.push(Diagnostic::ParseFailed {
                    path: path.to_path_buf(),
                    line: span.line,
                    column: span.column,
                    message: err.to_string(),
                });
                return None;
            }
        };

        let summary = transform_module(&mut module);
        for unsupported in summary.unsupported {
            warn!(
                "{}:{}: {} of \"{}\" is not rewritten and will not run inside the bundle",
                name,
                unsupported.span.line,
                unsupported.form.describe(),
                unsupported.specifier
            );
            self.diagnostics.push(Diagnostic::UnsupportedImport {
                path: path.to_path_buf(),
                specifier: unsupported.specifier,
                form: unsupported.form,
                line: unsupported.span.line,
            });
        }

        let mut dependencies = Vec::new();
        for specifier in extract_dependencies(&module) {
            if !is_relative(&specifier) {
                debug!("{}: leaving \"{}\" to the runtime loader", name, specifier);
                self.externals.insert(specifier);
                continue;
            }
            match self.resolver.resolve(&specifier, path) {
                Ok(resolved) => dependencies.push(resolved),
                Err(err) => warn!("{}: cannot resolve \"{}\": {}", name, specifier, err),
            }
        }

        Some((print_module(&module), dependencies))
    }

    fn report_cycle(&mut self, chain: Vec<PathBuf>) {
        let names: Vec<String> = chain.iter().map(|p| self.resolver.display_path(p)).collect();
        warn!("Circular dependency detected: {}", names.join(" -> "));
        self.diagnostics.push(Diagnostic::Cycle { chain });
    }
}
