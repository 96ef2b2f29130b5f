//! Module source loading

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a module's source
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File is not valid UTF-8
    #[error("{} is not valid UTF-8", path.display())]
    InvalidUtf8 { path: PathBuf },
}

/// Source of module text
pub trait SourceLoader {
    /// Read the full source text of the module at `path`
    fn load(&mut self, path: &Path) -> Result<String, LoadError>;
}

/// Loads modules from the file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&mut self, path: &Path) -> Result<String, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|_| LoadError::InvalidUtf8 {
            path: path.to_path_buf(),
        })
    }
}
