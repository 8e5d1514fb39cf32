//! Application configuration handling.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_INVENTORY_FILE;

/// Directory name used under the platform config and data roots.
pub const APP_DIR: &str = "stockroom";

/// Runtime configuration for the application.
///
/// Values are layered: built-in defaults, then the TOML file under
/// the platform config directory, then `STOCKROOM_*` environment
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the persisted inventory file.
    pub data_root: PathBuf,
    /// File name of the persisted inventory within `data_root`.
    pub inventory_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            inventory_file: DEFAULT_INVENTORY_FILE.to_string(),
        }
    }
}

impl AppConfig {
    /// Path of the user configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load configuration from defaults, the config file, and
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default(
                "data_root",
                defaults.data_root.to_string_lossy().to_string(),
            )?
            .set_default("inventory_file", defaults.inventory_file.clone())?
            .add_source(File::from(Self::config_path()).required(false))
            .add_source(Environment::with_prefix("STOCKROOM"))
            .build()
            .context("failed to build configuration")?;
        settings
            .try_deserialize()
            .context("failed to deserialize configuration")
    }

    /// Full path of the persisted inventory file.
    pub fn inventory_path(&self) -> PathBuf {
        self.data_root.join(&self.inventory_file)
    }
}

/// Write a default config file if none exists, returning its path.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = AppConfig::config_path();
    if path.exists() {
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let defaults = AppConfig::default();
    let contents = format!(
        "data_root = \"{}\"\ninventory_file = \"{}\"\n",
        defaults.data_root.display(),
        defaults.inventory_file
    );
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn default_data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_path_joins_root_and_file() {
        let config = AppConfig {
            data_root: PathBuf::from("/tmp/stockroom"),
            inventory_file: "inventory.json".to_string(),
        };
        assert_eq!(
            config.inventory_path(),
            PathBuf::from("/tmp/stockroom/inventory.json")
        );
    }

    #[test]
    fn defaults_use_the_standard_file_name() {
        let defaults = AppConfig::default();
        assert_eq!(defaults.inventory_file, DEFAULT_INVENTORY_FILE);
        assert!(defaults.data_root.ends_with(APP_DIR));
    }
}
