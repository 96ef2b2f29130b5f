//! CLI command implementations.

pub mod bundle;
pub mod graph;

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use tinypack_engine::{BundleConfig, ConfigFile, EmitOrder, CONFIG_FILE_NAME};

/// Options shared by commands that resolve a module graph
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Directory the entry is resolved against [default: working directory]
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Configuration file [default: ./tinypack.toml if present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extension appended to extensionless specifiers
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,
}

/// Wrapper order in the artifact
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    /// Order in which modules were first reached from the entry
    Discovery,
    /// Every module after the modules it imports
    DependenciesFirst,
}

impl From<OrderArg> for EmitOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Discovery => EmitOrder::Discovery,
            OrderArg::DependenciesFirst => EmitOrder::DependenciesFirst,
        }
    }
}

/// Build the bundle configuration: defaults, then the config file, then flags.
pub fn load_config(project: &ProjectArgs, overrides: ConfigFile) -> anyhow::Result<BundleConfig> {
    let config = match config_path(project.config.as_deref()) {
        Some(path) => BundleConfig::from_file(&path)?,
        None => BundleConfig::default(),
    };

    let config = config.merge(ConfigFile {
        base_dir: project.base_dir.clone(),
        extension: project.extension.clone(),
        ..overrides
    });
    config.validate()?;
    Ok(config)
}

/// Explicit config path, or `tinypack.toml` in the working directory if it exists.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(CONFIG_FILE_NAME);
            default.is_file().then_some(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "entry = \"src/a.js\"\nextension = \"mjs\"\norder = \"dependencies-first\"\n").unwrap();

        let project = ProjectArgs {
            config: Some(path),
            extension: Some("cjs".to_string()),
            ..ProjectArgs::default()
        };
        let config = load_config(
            &project,
            ConfigFile {
                output: Some(PathBuf::from("out.js")),
                ..ConfigFile::default()
            },
        )
        .unwrap();

        assert_eq!(config.entry, temp_dir.path().join("src").join("a.js"));
        assert_eq!(config.output, PathBuf::from("out.js"));
        assert_eq!(config.extension, "cjs");
        assert_eq!(config.order, EmitOrder::DependenciesFirst);
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let temp_dir = TempDir::new().unwrap();
        let project = ProjectArgs {
            config: Some(temp_dir.path().join("absent.toml")),
            ..ProjectArgs::default()
        };
        assert!(load_config(&project, ConfigFile::default()).is_err());
    }

    #[test]
    fn test_invalid_extension_flag_fails() {
        let project = ProjectArgs {
            config: None,
            extension: Some(".js".to_string()),
            ..ProjectArgs::default()
        };
        let err = load_config(&project, ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("extension"));
    }

    #[test]
    fn test_order_conversion() {
        assert_eq!(EmitOrder::from(OrderArg::DependenciesFirst), EmitOrder::DependenciesFirst);
        assert_eq!(EmitOrder::from(OrderArg::Discovery), EmitOrder::Discovery);
    }
}
