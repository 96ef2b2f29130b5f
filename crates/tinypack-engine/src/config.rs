//! Bundle configuration (tinypack.toml)
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! file, and explicit overrides (command-line flags). Later layers win.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::codegen::EmitOrder;
use crate::module::{normalize, DEFAULT_EXTENSION};

/// Conventional name of the configuration file
pub const CONFIG_FILE_NAME: &str = "tinypack.toml";

/// Default entry module, relative to the base directory
pub const DEFAULT_ENTRY: &str = "./index.js";

/// Default artifact path
pub const DEFAULT_OUTPUT: &str = "./dist/bundle.js";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Contents of a configuration file; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Entry module, relative to the base directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,

    /// Artifact path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Directory the entry is resolved against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    /// Extension appended to extensionless specifiers (without leading dot)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Order of module wrappers in the artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<EmitOrder>,
}

impl ConfigFile {
    /// Parse a config file from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Interpret relative paths as relative to `dir`
    fn relative_to(mut self, dir: &Path) -> Self {
        for path in [&mut self.entry, &mut self.output, &mut self.base_dir]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = normalize(&dir.join(&*path));
            }
        }
        self
    }
}

/// Fully resolved bundle settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleConfig {
    /// Entry module, relative to `base_dir` unless absolute
    pub entry: PathBuf,
    /// Artifact path
    pub output: PathBuf,
    /// Directory the entry is resolved against and module names are shown relative to
    pub base_dir: PathBuf,
    /// Default source extension, without leading dot
    pub extension: String,
    /// Order of module wrappers
    pub order: EmitOrder,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            entry: PathBuf::from(DEFAULT_ENTRY),
            output: PathBuf::from(DEFAULT_OUTPUT),
            base_dir: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            order: EmitOrder::default(),
        }
    }
}

impl BundleConfig {
    /// Load settings from a config file over the defaults
    ///
    /// Relative paths in the file are taken relative to the file's
    /// directory, which is also the default base directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let file = ConfigFile::parse(&content)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let dir = if dir.is_absolute() {
            dir
        } else {
            let cwd = std::env::current_dir().map_err(|source| ConfigError::IoError {
                path: path.to_path_buf(),
                source,
            })?;
            cwd.join(dir)
        };
        let dir = normalize(&dir);

        let config = Self {
            base_dir: dir.clone(),
            ..Self::default()
        }
        .merge(file.relative_to(&dir));
        config.validate()?;
        Ok(config)
    }

    /// Apply every setting present in `layer`
    pub fn merge(mut self, layer: ConfigFile) -> Self {
        if let Some(entry) = layer.entry {
            self.entry = entry;
        }
        if let Some(output) = layer.output {
            self.output = output;
        }
        if let Some(base_dir) = layer.base_dir {
            self.base_dir = base_dir;
        }
        if let Some(extension) = layer.extension {
            self.extension = extension;
        }
        if let Some(order) = layer.order {
            self.order = order;
        }
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "entry cannot be empty".to_string(),
            ));
        }

        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "output cannot be empty".to_string(),
            ));
        }

        if self.extension.is_empty() {
            return Err(ConfigError::ValidationError(
                "extension cannot be empty".to_string(),
            ));
        }

        if self.extension.starts_with('.') || self.extension.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid extension: {}. Write it without a leading dot (e.g., \"js\")",
                self.extension
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = BundleConfig::default();
        assert_eq!(config.entry, PathBuf::from("./index.js"));
        assert_eq!(config.output, PathBuf::from("./dist/bundle.js"));
        assert_eq!(config.extension, "js");
        assert_eq!(config.order, EmitOrder::Discovery);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let file = ConfigFile::parse(
            r#"
entry = "src/index.js"
output = "out/app.js"
base_dir = "."
extension = "mjs"
order = "dependencies-first"
"#,
        )
        .unwrap();

        assert_eq!(file.entry, Some(PathBuf::from("src/index.js")));
        assert_eq!(file.extension.as_deref(), Some("mjs"));
        assert_eq!(file.order, Some(EmitOrder::DependenciesFirst));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigFile::parse("entry = \"a.js\"\nminify = true\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_from_file_paths_relative_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let path = project.join(CONFIG_FILE_NAME);
        fs::write(&path, "entry = \"src/main.js\"\noutput = \"build/out.js\"\n").unwrap();

        let config = BundleConfig::from_file(&path).unwrap();
        assert_eq!(config.entry, project.join("src").join("main.js"));
        assert_eq!(config.output, project.join("build").join("out.js"));
        assert_eq!(config.base_dir, project);
        assert_eq!(config.extension, "js");
    }

    #[test]
    fn test_from_file_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "base_dir = \"web/../app\"\n").unwrap();

        let config = BundleConfig::from_file(&path).unwrap();
        assert_eq!(config.base_dir, temp_dir.path().join("app"));
        assert_eq!(config.entry, PathBuf::from(DEFAULT_ENTRY));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = BundleConfig::from_file(&temp_dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_merge_overrides() {
        let config = BundleConfig::default().merge(ConfigFile {
            output: Some(PathBuf::from("out.js")),
            order: Some(EmitOrder::DependenciesFirst),
            ..ConfigFile::default()
        });
        assert_eq!(config.output, PathBuf::from("out.js"));
        assert_eq!(config.order, EmitOrder::DependenciesFirst);
        assert_eq!(config.entry, PathBuf::from(DEFAULT_ENTRY));
    }

    #[test]
    fn test_invalid_extension() {
        let config = BundleConfig {
            extension: ".js".to_string(),
            ..BundleConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let config = BundleConfig {
            extension: String::new(),
            ..BundleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_entry() {
        let config = BundleConfig {
            entry: PathBuf::new(),
            ..BundleConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
