//! Application configuration.
//!
//! Settings are layered: built-in defaults, then the optional JSON file in
//! the user's config directory, then `STATION_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "station-registry";
/// File name of the configuration file.
pub const CONFIG_FILE: &str = "config.json";
/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "STATION";

/// How Train, TrainTimetable and TrainBrigade keys are disambiguated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Append the suffix until the key is free.
    #[default]
    Repeat,
    /// Append the suffix a single time, overwriting whatever holds that key.
    Once,
}

impl CollisionPolicy {
    fn as_str(self) -> &'static str {
        match self {
            CollisionPolicy::Repeat => "repeat",
            CollisionPolicy::Once => "once",
        }
    }
}

/// What happens when two sales land on the same second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleCollision {
    /// Replace the earlier sheet.
    #[default]
    Overwrite,
    /// Refuse the new sale with a duplicate key error.
    Reject,
}

impl SaleCollision {
    fn as_str(self) -> &'static str {
        match self {
            SaleCollision::Overwrite => "overwrite",
            SaleCollision::Reject => "reject",
        }
    }
}

/// Runtime settings for the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the snapshot and the journal.
    pub data_dir: PathBuf,
    /// Snapshot file name inside `data_dir`.
    pub snapshot_file: String,
    /// Journal file name inside `data_dir`; `None` disables the journal.
    pub journal_file: Option<String>,
    /// Key disambiguation for trains, timetables and brigades.
    pub collision_policy: CollisionPolicy,
    /// Handling of sales recorded within the same second.
    pub sale_collision: SaleCollision,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_file: "station.json".to_string(),
            journal_file: Some("transaction.txt".to_string()),
            collision_policy: CollisionPolicy::default(),
            sale_collision: SaleCollision::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file and the process environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` and the process environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layers(path.as_ref(), None)
    }

    /// Load configuration from `path` with an explicit set of environment
    /// variables instead of the process environment.
    pub fn load_with_env(path: impl AsRef<Path>, env: Map<String, String>) -> Result<Self> {
        Self::load_layers(path.as_ref(), Some(env))
    }

    fn load_layers(path: &Path, env: Option<Map<String, String>>) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
            .set_default("snapshot_file", defaults.snapshot_file)?
            .set_default("journal_file", defaults.journal_file)?
            .set_default("collision_policy", defaults.collision_policy.as_str())?
            .set_default("sale_collision", defaults.sale_collision.as_str())?
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Location of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }

    /// Location of the journal file, if journaling is enabled.
    pub fn journal_path(&self) -> Option<PathBuf> {
        self.journal_file
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| self.data_dir.join(name))
    }
}

/// Default location of the configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Write a default configuration file unless one already exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    ensure_default_config_at(config_path())
}

/// Write a default configuration file at `path` unless it already exists.
pub fn ensure_default_config_at(path: impl Into<PathBuf>) -> Result<PathBuf> {
    let path = path.into();
    if path.exists() {
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let serialised = serde_json::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default configuration")?;
    fs::write(&path, serialised).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_with_env(dir.path().join("absent.json"), Map::new())?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn file_and_environment_layers_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        let file = serde_json::json!({
            "data_dir": dir.path(),
            "collision_policy": "once",
            "journal_file": "",
        });
        fs::write(&path, file.to_string())?;

        let mut env = Map::new();
        env.insert("STATION_SALE_COLLISION".to_string(), "reject".to_string());
        env.insert("STATION_SNAPSHOT_FILE".to_string(), "depot.json".to_string());

        let config = AppConfig::load_with_env(&path, env)?;
        assert_eq!(config.collision_policy, CollisionPolicy::Once);
        assert_eq!(config.sale_collision, SaleCollision::Reject);
        assert_eq!(config.snapshot_path(), dir.path().join("depot.json"));
        assert_eq!(config.journal_path(), None);
        Ok(())
    }

    #[test]
    fn ensure_default_config_writes_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);
        ensure_default_config_at(&path)?;
        let written: AppConfig = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(written, AppConfig::default());

        fs::write(&path, "{}")?;
        ensure_default_config_at(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "{}");
        Ok(())
    }
}
