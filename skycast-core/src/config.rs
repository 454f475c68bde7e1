use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Connection settings for the weather API.
///
/// Passed into the endpoint builder at construction time; loaded once at
/// startup, no hot-reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API credential, an opaque configured string.
    pub api_key: String,
    /// Base URL for data requests.
    pub base_url: String,
    /// Base URL for icon assets, a separate host from the data API.
    pub icon_base_url: String,
    /// Country code appended to every name search.
    pub country_code: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openweathermap.org".to_string(),
            icon_base_url: "https://openweathermap.org".to_string(),
            country_code: "USA".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the API credential.
    pub fn set_api_key(&mut self, api_key: String) {
        self.api.api_key = api_key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_openweather_with_no_credential() {
        let cfg = Config::default();
        assert!(!cfg.api.has_api_key());
        assert_eq!(cfg.api.base_url, "https://api.openweathermap.org");
        assert_eq!(cfg.api.icon_base_url, "https://openweathermap.org");
        assert_eq!(cfg.api.country_code, "USA");
    }

    #[test]
    fn set_api_key_marks_config_ready() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        assert!(cfg.api.has_api_key());
        assert_eq!(cfg.api.api_key, "KEY");
    }

    #[test]
    fn config_round_trips_through_toml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = Config::load_from(&dir.path().join("nope.toml")).expect("load");
        assert_eq!(loaded, Config::default());
    }
}
