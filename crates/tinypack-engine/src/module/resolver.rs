//! Module path resolution
//!
//! Maps relative import specifiers to module identities: absolute,
//! lexically normalized paths. Symlinks are not followed and the file does
//! not need to exist.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default extension for module sources
pub const DEFAULT_EXTENSION: &str = "js";

/// Errors that can occur during module resolution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Specifier is not relative; left to the runtime loader
    #[error("Not a relative specifier: {0}")]
    External(String),

    /// Importing file has no parent directory
    #[error("Cannot resolve import: {0} has no parent directory")]
    NoParentDirectory(PathBuf),

    /// Working directory unavailable
    #[error("IO error: {0}")]
    IoError(String),
}

/// Returns true if `specifier` names a module relative to its importer.
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Module resolver for import specifiers
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    /// Absolute directory the entry and displayed paths are relative to
    base_dir: PathBuf,
    /// Extension appended to specifiers without one
    extension: String,
}

impl ModuleResolver {
    /// Create a new module resolver
    ///
    /// A relative `base_dir` is taken relative to the working directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let base_dir = base_dir.as_ref();
        let base_dir = if base_dir.is_absolute() {
            normalize(base_dir)
        } else {
            let cwd = std::env::current_dir().map_err(|e| ResolveError::IoError(e.to_string()))?;
            normalize(&cwd.join(base_dir))
        };
        Ok(Self {
            base_dir,
            extension: DEFAULT_EXTENSION.to_string(),
        })
    }

    /// Create a module resolver with the current directory as base
    pub fn current_dir() -> Result<Self, ResolveError> {
        Self::new(".")
    }

    /// Use `extension` (without leading dot) for specifiers that have none
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Identity of the entry module
    pub fn resolve_entry(&self, entry: &Path) -> PathBuf {
        normalize(&self.base_dir.join(entry))
    }

    /// Resolve an import specifier to a module identity
    ///
    /// # Arguments
    /// * `specifier` - The import specifier (e.g., "./utils", "../lib/helper.js")
    /// * `from_file` - The module containing the import
    ///
    /// `./utils` resolves to `utils.js` next to `from_file`; a specifier
    /// naming a directory (`.`, `..`, or a trailing `/`) resolves to its
    /// `index.js`.
    pub fn resolve(&self, specifier: &str, from_file: &Path) -> Result<PathBuf, ResolveError> {
        if !is_relative(specifier) {
            return Err(ResolveError::External(specifier.to_string()));
        }

        let from_dir = from_file
            .parent()
            .ok_or_else(|| ResolveError::NoParentDirectory(from_file.to_path_buf()))?;

        let joined = normalize(&from_dir.join(specifier));
        let names_directory = specifier == "."
            || specifier == ".."
            || specifier.ends_with('/')
            || specifier.ends_with("/.")
            || specifier.ends_with("/..");

        if names_directory {
            return Ok(joined.join(format!("index.{}", self.extension)));
        }

        if joined.extension().is_some() {
            return Ok(joined);
        }

        let mut file_name = joined.file_name().unwrap_or_default().to_os_string();
        file_name.push(".");
        file_name.push(&self.extension);
        Ok(joined.with_file_name(file_name))
    }

    /// `path` relative to the base directory with `/` separators, for display
    pub fn display_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.base_dir).unwrap_or(path);
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if relative.has_root() {
            relative.to_string_lossy().into_owned()
        } else {
            parts.join("/")
        }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the default source extension
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

/// Fold `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(normalized.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
