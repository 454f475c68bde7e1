//! Persisted preferences: the last successfully loaded city and the one-time
//! initial-location-load flag. One JSON file, overwritten whole on every write.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::City;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Preferences {
    saved_city: Option<City>,
    initial_location_load: bool,
}

/// Single-slot preference store.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Store at the platform data directory.
    pub fn open() -> Result<Self> {
        Ok(Self {
            path: Self::preferences_file_path()?,
        })
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: &Path) -> Self {
        Self {
            path: dir.join("preferences.json"),
        }
    }

    /// Path to the preferences file.
    pub fn preferences_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("preferences.json"))
    }

    /// Last city the user loaded successfully, if any. An unreadable or
    /// malformed file reads as empty.
    pub fn saved_city(&self) -> Option<City> {
        self.read().ok().and_then(|prefs| prefs.saved_city)
    }

    /// Overwrite the saved-city slot.
    pub fn save_city(&self, city: &City) -> Result<()> {
        let mut prefs = self.read().unwrap_or_default();
        prefs.saved_city = Some(city.clone());
        self.write(&prefs)
    }

    /// Whether the one-time automatic location load has already happened.
    pub fn initial_location_load_done(&self) -> bool {
        self.read().map(|prefs| prefs.initial_location_load).unwrap_or(false)
    }

    /// Record that the one-time automatic location load has happened.
    pub fn mark_initial_location_load(&self) -> Result<()> {
        let mut prefs = self.read().unwrap_or_default();
        prefs.initial_location_load = true;
        self.write(&prefs)
    }

    fn read(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences file: {}", self.path.display()))?;

        let prefs = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences file: {}", self.path.display()))?;

        Ok(prefs)
    }

    fn write(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(prefs).context("Failed to serialize preferences")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write preferences file: {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> City {
        City {
            name: "Plano".to_string(),
            lat: 33.0198,
            lon: -96.6989,
            weather: None,
        }
    }

    #[test]
    fn empty_store_has_no_saved_city() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::at(dir.path());

        assert!(store.saved_city().is_none());
        assert!(!store.initial_location_load_done());
    }

    #[test]
    fn saved_city_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::at(dir.path());

        store.save_city(&city()).expect("save");
        assert_eq!(store.saved_city(), Some(city()));
    }

    #[test]
    fn saving_overwrites_the_whole_slot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::at(dir.path());

        store.save_city(&city()).expect("save");
        let other = City {
            name: "Austin".to_string(),
            lat: 30.2672,
            lon: -97.7431,
            weather: None,
        };
        store.save_city(&other).expect("save");

        assert_eq!(store.saved_city(), Some(other));
    }

    #[test]
    fn initial_location_load_flag_sticks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::at(dir.path());

        store.mark_initial_location_load().expect("mark");
        assert!(store.initial_location_load_done());

        // The flag survives a city write, both live in the same file.
        store.save_city(&city()).expect("save");
        assert!(store.initial_location_load_done());
        assert_eq!(store.saved_city(), Some(city()));
    }

    #[test]
    fn malformed_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::at(dir.path());
        fs::write(dir.path().join("preferences.json"), "not json").expect("write");

        assert!(store.saved_city().is_none());
        assert!(!store.initial_location_load_done());
    }
}
