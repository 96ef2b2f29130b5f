//! Transformed-source cache
//!
//! Holds the outcome of processing each module during one bundle run:
//! either its transformed source text or the fact that it could not be
//! resolved.

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Outcome of processing one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleState {
    /// Source after import/export rewriting
    Transformed(String),
    /// Loading or parsing failed; the module is left out of the bundle
    Unresolved,
}

/// Cache of processed modules by path
#[derive(Debug, Default, Clone)]
pub struct ModuleCache {
    entries: FxHashMap<PathBuf, ModuleState>,
}

impl ModuleCache {
    /// Create a new empty module cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the transformed source of a module
    pub fn insert_transformed(&mut self, path: PathBuf, source: String) {
        self.entries.insert(path, ModuleState::Transformed(source));
    }

    /// Record that a module could not be resolved
    pub fn mark_unresolved(&mut self, path: PathBuf) {
        self.entries.insert(path, ModuleState::Unresolved);
    }

    /// Get the state of a module
    pub fn get(&self, path: &Path) -> Option<&ModuleState> {
        self.entries.get(path)
    }

    /// Transformed source of a module, if it resolved
    pub fn transformed(&self, path: &Path) -> Option<&str> {
        match self.entries.get(path) {
            Some(ModuleState::Transformed(source)) => Some(source),
            _ => None,
        }
    }

    /// Returns true if the module was recorded as unresolved
    pub fn is_unresolved(&self, path: &Path) -> bool {
        matches!(self.entries.get(path), Some(ModuleState::Unresolved))
    }

    /// Get the number of cached modules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
