//! Store configuration
//!
//! Loaded through confy (TOML) from the platform config directory, or from an
//! explicit path. Any field left out of the file takes its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_NAME: &str = "fxrecipe";
const CONFIG_NAME: &str = "store";

/// Recipe store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one file per recipe set
    pub directory: PathBuf,

    /// Recognized file extension, without the dot
    pub extension: String,

    /// Write indented, multi-line files
    pub pretty: bool,

    /// Create `directory` when the store is opened and it does not exist
    pub create_directory: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: default_recipe_dir(),
            extension: "json".to_string(),
            pretty: true,
            create_directory: true,
        }
    }
}

impl StoreConfig {
    /// Defaults, bound to an explicit directory
    pub fn for_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Load from the platform config location, falling back to defaults
    pub fn load() -> Self {
        match confy::load::<Self>(APP_NAME, CONFIG_NAME) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load store config, using defaults");
                Self::default()
            }
        }
    }

    /// Load from a specific TOML file
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        Ok(confy::load_path(path)?)
    }

    pub fn store_path(&self, path: &Path) -> Result<(), ConfigError> {
        Ok(confy::store_path(path, self.clone())?)
    }

    /// Where [`StoreConfig::load`] reads from
    pub fn default_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).ok()
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Default recipe directory: `<config dir>/fxrecipe/recipes`
pub fn default_recipe_dir() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME).join("recipes"))
        .unwrap_or_else(|| PathBuf::from("recipes"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Confy(#[from] confy::ConfyError),

    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
directory = "/tmp/recipes"
pretty = false
"#,
        )
        .unwrap();
        assert_eq!(config.directory, PathBuf::from("/tmp/recipes"));
        assert!(!config.pretty);
        assert_eq!(config.extension, "json");
        assert!(config.create_directory);
    }

    #[test]
    fn test_store_and_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");

        let mut config = StoreConfig::for_directory(dir.path().join("recipes"));
        config.extension = "fxr".to_string();
        config.store_path(&path).unwrap();

        let loaded = StoreConfig::load_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_to_toml_string() {
        let config = StoreConfig::for_directory("/data/fx");
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("extension = \"json\""));
        assert!(text.contains("pretty = true"));
    }
}
