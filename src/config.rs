//! Translator configuration.
//!
//! Read from TOML:
//!
//! ```toml
//! [pagination]
//! collapse_offset_projection = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{TranslateError, TranslateResult};
use crate::translator::TranslateOptions;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// `[pagination]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    /// Replace the projection with `*` for `TOP n START AT m`.
    #[serde(default = "default_true")]
    pub collapse_offset_projection: bool,
}

fn default_true() -> bool { true }

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            collapse_offset_projection: true,
        }
    }
}

impl Config {
    /// Create a new configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> TranslateResult<Self> {
        toml::from_str(content).map_err(|e| TranslateError::config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> TranslateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| TranslateError::config(format!("{}: {}", path.display(), e)))
    }

    /// Default location: `<config dir>/pg2sybase/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pg2sybase").join("config.toml"))
    }

    /// Load `explicit` if given, else the default file if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> TranslateResult<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn translate_options(&self) -> TranslateOptions {
        TranslateOptions {
            collapse_offset_projection: self.pagination.collapse_offset_projection,
        }
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set whether `START AT` pagination collapses the projection
    pub fn collapse_offset_projection(mut self, collapse: bool) -> Self {
        self.config.pagination.collapse_offset_projection = collapse;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.translate_options().collapse_offset_projection);
    }

    #[test]
    fn test_pagination_section() {
        let config = Config::from_toml("[pagination]\ncollapse_offset_projection = false\n").unwrap();
        assert!(!config.translate_options().collapse_offset_projection);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = Config::from_toml("[pagination]\ncollapse = false\n").unwrap_err();
        assert!(matches!(err, TranslateError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/pg2sybase.toml"))).unwrap_err();
        assert!(matches!(err, TranslateError::Io(_)));
    }

    #[test]
    fn test_builder() {
        let config = Config::builder().collapse_offset_projection(false).build();
        assert!(!config.pagination.collapse_offset_projection);
    }
}
