//! Configuration loader for memprobe
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults;
use crate::core::types::ByteOrder;
use crate::provider::TargetLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub types: TypesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Traversal and rendering bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "defaults::default_max_search")]
    pub max_search: usize,
    #[serde(default = "defaults::default_max_print")]
    pub max_print: usize,
    #[serde(default = "defaults::default_max_regions")]
    pub max_regions: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_search: defaults::default_max_search(),
            max_print: defaults::default_max_print(),
            max_regions: defaults::default_max_regions(),
        }
    }
}

/// Inspected target description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "defaults::default_pointer_size")]
    pub pointer_size: usize,
    #[serde(default = "defaults::default_byte_order")]
    pub byte_order: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            pointer_size: defaults::default_pointer_size(),
            byte_order: defaults::default_byte_order(),
        }
    }
}

impl TargetConfig {
    pub fn layout(&self) -> Result<TargetLayout, ConfigError> {
        let byte_order =
            ByteOrder::from_str(&self.byte_order).map_err(ConfigError::Invalid)?;
        Ok(TargetLayout {
            pointer_size: self.pointer_size,
            byte_order,
        })
    }
}

/// Well-known type names in the inspected program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesConfig {
    #[serde(default = "defaults::default_list_link")]
    pub list_link: String,
    #[serde(default = "defaults::default_tree_link")]
    pub tree_link: String,
    #[serde(default = "defaults::default_scatter_type")]
    pub scatter: String,
    /// Types rendered as address/port pairs instead of flat byte dumps.
    #[serde(default = "defaults::default_address_types")]
    pub address_types: Vec<String>,
    /// Collaborator expression yielding the current errno value.
    #[serde(default = "defaults::default_errno_expr")]
    pub errno_expr: String,
    /// Session-context variable for the `--context` dump.
    #[serde(default = "defaults::default_context_var")]
    pub context_var: String,
}

impl Default for TypesConfig {
    fn default() -> Self {
        TypesConfig {
            list_link: defaults::default_list_link(),
            tree_link: defaults::default_tree_link(),
            scatter: defaults::default_scatter_type(),
            address_types: defaults::default_address_types(),
            errno_expr: defaults::default_errno_expr(),
            context_var: defaults::default_context_var(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    #[serde(default = "defaults::default_log_file")]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: defaults::default_log_level(),
            file: defaults::default_log_file(),
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if file doesn't exist
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.max_search, 256);
        assert_eq!(config.limits.max_print, 20);
        assert_eq!(config.types.list_link, "list_head");
        assert_eq!(config.target.layout().unwrap().pointer_size, 8);
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let result = loader.load();
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_or_default() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let config = loader.load_or_default();
        assert_eq!(config.limits.max_print, 20);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [limits]
            max_search = 32

            [types]
            scatter = "wad_sstr"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.limits.max_search, 32);
        assert_eq!(config.limits.max_print, 20);
        assert_eq!(config.types.scatter, "wad_sstr");
        assert_eq!(config.types.tree_link, "avl_node");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[target]\npointer_size = 4\nbyte_order = \"big\"").unwrap();

        let config = ConfigLoader::new(file.path()).load().unwrap();
        let layout = config.target.layout().unwrap();
        assert_eq!(layout.pointer_size, 4);
        assert_eq!(layout.byte_order, ByteOrder::Big);
    }
}
