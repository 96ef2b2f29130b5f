//! Artifact output

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing the bundle artifact
#[derive(Debug, Error)]
pub enum WriteError {
    /// Output directory could not be created
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Artifact could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination of the bundle artifact
pub trait ArtifactWriter {
    /// Write `contents` as the complete artifact at `path`
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), WriteError>;
}

/// Writes the artifact to the file system, creating missing parent directories
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl ArtifactWriter for FsWriter {
    fn write(&mut self, path: &Path, contents: &str) -> Result<(), WriteError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // A failed write never leaves a partial artifact at `path`
        let tmp_path = sibling_tmp_path(path);
        write_and_rename(&tmp_path, path, contents).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            WriteError::Write {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

fn write_and_rename(tmp_path: &Path, path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp_file = fs::File::create(tmp_path)?;
    tmp_file.write_all(contents.as_bytes())?;
    tmp_file.sync_all()?;
    fs::rename(tmp_path, path)
}

/// `dir/.bundle.js.tmp` for `dir/bundle.js`
fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| OsStr::new("bundle")));
    name.push(".tmp");
    path.with_file_name(name)
}
