// Configuration management for persistent state

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::connection::SavedConnection;
use crate::state::settings::ExplorerSettings;

#[cfg(debug_assertions)]
const APP_NAME: &str = "mango-explorer-dev";

#[cfg(not(debug_assertions))]
const APP_NAME: &str = "mango-explorer";

/// Manages persistent configuration files
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    const CONNECTIONS_FILE: &'static str = "connections.json";
    const SETTINGS_FILE: &'static str = "settings.json";

    /// Create a new ConfigManager, initializing the config directory if needed
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .context("Could not determine config directory")?;
        Self::with_config_dir(config_dir)
    }

    /// Use an explicit directory instead of the platform default.
    pub fn with_config_dir(config_dir: PathBuf) -> Result<Self> {
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn file_path(&self, filename: &str) -> PathBuf {
        self.config_dir.join(filename)
    }

    fn load_json<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);

        if !path.exists() {
            return Ok(None);
        }

        let data =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", filename))?;

        let value: T = serde_json::from_str(&data)
            .with_context(|| format!("Failed to deserialize {}", filename))?;

        Ok(Some(value))
    }

    /// Save data to a JSON file (atomic via temp + rename).
    fn save_json<T: Serialize + ?Sized>(&self, filename: &str, data: &T) -> Result<()> {
        let path = self.file_path(filename);

        let json = serde_json::to_string_pretty(data)
            .with_context(|| format!("Failed to serialize {}", filename))?;

        atomic_write(&path, json.as_bytes())
            .with_context(|| format!("Failed to write {}", filename))?;

        Ok(())
    }

    /// Load saved connections from disk
    pub fn load_connections(&self) -> Result<Vec<SavedConnection>> {
        Ok(self.load_json(Self::CONNECTIONS_FILE)?.unwrap_or_default())
    }

    /// Save connections to disk
    pub fn save_connections(&self, connections: &[SavedConnection]) -> Result<()> {
        self.save_json(Self::CONNECTIONS_FILE, connections)
    }

    pub fn load_settings(&self) -> Result<ExplorerSettings> {
        Ok(self.load_json(Self::SETTINGS_FILE)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &ExplorerSettings) -> Result<()> {
        self.save_json(Self::SETTINGS_FILE, settings)
    }
}

/// Write `data` to a sibling temp file, then rename it over `path`.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(path);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_files_yield_defaults() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp_dir.path().join("nested"))
            .expect("failed to create config manager");

        assert!(manager.load_connections().expect("load connections").is_empty());
        assert_eq!(manager.load_settings().expect("load settings"), ExplorerSettings::default());
    }

    #[test]
    fn connections_round_trip_through_json() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf())
            .expect("failed to create config manager");

        let connection =
            SavedConnection::new("local".to_string(), "mongodb://localhost:27017".into());
        manager.save_connections(std::slice::from_ref(&connection)).expect("save connections");

        let loaded = manager.load_connections().expect("failed to load json connections");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, connection.id);
        assert_eq!(loaded[0].name, "local");
        assert!(temp_dir.path().join(ConfigManager::CONNECTIONS_FILE).exists());
    }

    #[test]
    fn settings_are_persisted() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf())
            .expect("failed to create config manager");

        let settings = ExplorerSettings { show_change_streams: true, ..Default::default() };
        manager.save_settings(&settings).expect("save settings");

        assert!(manager.load_settings().expect("load settings").show_change_streams);
    }

    #[test]
    fn malformed_settings_are_reported() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf())
            .expect("failed to create config manager");
        fs::write(temp_dir.path().join(ConfigManager::SETTINGS_FILE), "{ not json")
            .expect("write settings");

        let err = manager.load_settings().unwrap_err();
        assert!(err.to_string().contains("settings.json"));
    }
}
