//! Bundle pipeline
//!
//! Wires the graph resolver, the emitter and the artifact writer together
//! for one configuration.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::codegen::{emit_bundle, ArtifactWriter, FsWriter};
use crate::config::BundleConfig;
use crate::error::BundleError;
use crate::module::{Diagnostic, FsLoader, GraphResolver, ModuleResolver, Resolution, Severity, SourceLoader};

/// Outcome of a successful bundle run
#[derive(Debug, Clone)]
pub struct BundleReport {
    /// Identity of the entry module
    pub entry: PathBuf,
    /// Modules embedded in the artifact, in output order
    pub modules: Vec<PathBuf>,
    /// Modules that could not be loaded or parsed, in discovery order
    pub unresolved: Vec<PathBuf>,
    /// Specifiers left to the runtime loader
    pub externals: Vec<String>,
    /// Problems found while resolving
    pub diagnostics: Vec<Diagnostic>,
    /// Where the artifact was written
    pub output: PathBuf,
    /// Artifact size in bytes
    pub bytes: usize,
}

impl BundleReport {
    /// Number of error-level diagnostics
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning-level diagnostics
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == severity)
            .count()
    }
}

/// Bundler for one configuration
#[derive(Debug, Clone)]
pub struct Bundler {
    config: BundleConfig,
}

impl Bundler {
    pub fn new(config: BundleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Resolver for the configured base directory and extension
    pub fn module_resolver(&self) -> Result<ModuleResolver, BundleError> {
        Ok(ModuleResolver::new(&self.config.base_dir)?.with_extension(&self.config.extension))
    }

    /// Walk the dependency graph without emitting anything
    pub fn resolve_with<L: SourceLoader>(
        &self,
        resolver: &ModuleResolver,
        loader: &mut L,
    ) -> Resolution {
        GraphResolver::new(resolver, loader).resolve(&self.config.entry)
    }

    /// Bundle from the file system into the configured output file
    pub fn bundle(&self) -> Result<BundleReport, BundleError> {
        self.bundle_with(&mut FsLoader, &mut FsWriter)
    }

    /// Bundle with the given source loader and artifact writer
    pub fn bundle_with<L: SourceLoader, W: ArtifactWriter>(
        &self,
        loader: &mut L,
        writer: &mut W,
    ) -> Result<BundleReport, BundleError> {
        self.config.validate()?;
        let resolver = self.module_resolver()?;

        let resolution = self.resolve_with(&resolver, loader);
        debug!(
            "Resolved {} modules from {}",
            resolution.graph.len(),
            resolver.display_path(&resolution.entry)
        );

        let bundle = emit_bundle(&resolution, &resolver, self.config.order);
        writer.write(&self.config.output, &bundle.code)?;
        info!(
            "Wrote {} modules ({} bytes) to {}",
            bundle.modules.len(),
            bundle.code.len(),
            self.config.output.display()
        );

        Ok(BundleReport {
            unresolved: resolution.unresolved(),
            entry: resolution.entry,
            modules: bundle.modules,
            externals: resolution.externals.into_iter().collect(),
            diagnostics: resolution.diagnostics,
            output: self.config.output.clone(),
            bytes: bundle.code.len(),
        })
    }
}
