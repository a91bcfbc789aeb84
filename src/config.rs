// Configuration loaded from YAML

use crate::provider::{FileProvider, MemoryProvider, Provider, SqliteProvider};
use crate::store::{DEFAULT_KEY_PREFIX, StoreOptions};
use chrono::Duration;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "dashstore";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub key_prefix: String,
    pub sweep_on_open: bool,
    pub sweep_after_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: default_data_dir(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            sweep_on_open: true,
            sweep_after_hours: 24,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".dashstore"))
}

/// `<config_dir>/dashstore/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.yaml"))
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), ?config, "Loaded config");
        config
            .store_options()
            .wrap_err_with(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Store options for this config. Fails on a bad key prefix or a sweep
    /// window that is non-positive or out of range.
    pub fn store_options(&self) -> Result<StoreOptions> {
        if self.sweep_after_hours <= 0 {
            return Err(eyre!(
                "sweep_after_hours must be positive, got {}",
                self.sweep_after_hours
            ));
        }
        let sweep_after = Duration::try_hours(self.sweep_after_hours)
            .ok_or_else(|| eyre!("sweep_after_hours out of range: {}", self.sweep_after_hours))?;

        let options = StoreOptions {
            key_prefix: self.key_prefix.clone(),
            sweep_after,
            sweep_on_open: self.sweep_on_open,
        };
        options.validate()?;
        Ok(options)
    }

    /// Construct the configured persistence backend
    pub fn open_provider(&self) -> Result<Box<dyn Provider>> {
        let provider: Box<dyn Provider> = match self.backend {
            Backend::File => Box::new(FileProvider::open(&self.data_dir)?),
            Backend::Sqlite => Box::new(SqliteProvider::open(&self.data_dir)?),
            Backend::Memory => Box::new(MemoryProvider::new()),
        };
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(&temp.path().join("nope.yaml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.key_prefix, "dashboard_");
        assert_eq!(config.sweep_after_hours, 24);
        assert!(config.sweep_on_open);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "backend: sqlite\nsweep_after_hours: 48\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.sweep_after_hours, 48);
        assert_eq!(config.key_prefix, "dashboard_");
        assert_eq!(config.store_options().unwrap().sweep_after, Duration::hours(48));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "backend: [oops").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_sweep_window_must_be_positive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");

        for hours in ["0", "-1"] {
            fs::write(&path, format!("sweep_after_hours: {}\n", hours)).unwrap();
            assert!(Config::load(Some(&path)).is_err());
        }

        let config = Config {
            sweep_after_hours: -1,
            ..Config::default()
        };
        assert!(config.store_options().is_err());
    }

    #[test]
    fn test_huge_sweep_window_is_an_error_not_a_panic() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, format!("sweep_after_hours: {}\n", i64::MAX / 1000)).unwrap();
        assert!(Config::load(Some(&path)).is_err());

        let config = Config {
            sweep_after_hours: i64::MAX,
            ..Config::default()
        };
        assert!(config.store_options().is_err());
    }

    #[test]
    fn test_bad_key_prefix_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "key_prefix: \"../\"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.yaml");
        let config = Config {
            backend: Backend::Memory,
            data_dir: temp.path().join("data"),
            key_prefix: "test_".to_string(),
            sweep_on_open: false,
            sweep_after_hours: 12,
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_open_provider_per_backend() {
        let temp = TempDir::new().unwrap();
        for backend in [Backend::File, Backend::Sqlite, Backend::Memory] {
            let config = Config {
                backend,
                data_dir: temp.path().to_path_buf(),
                ..Config::default()
            };
            let mut provider = config.open_provider().unwrap();
            provider.set("dashboard_notes", "[]").unwrap();
            assert_eq!(provider.get("dashboard_notes").unwrap().as_deref(), Some("[]"));
        }
        assert!(temp.path().join("dashboard_notes.json").exists());
        assert!(temp.path().join("dashstore.db").exists());
    }
}
