use anyhow::Result;
use directories::ProjectDirs;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::AppConfig;

const APP_NAME: &str = "FileTriage";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-specific configuration directory for the application.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "filetriage", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

/// Returns the full path to the configuration file.
///
/// `dir_override` replaces the platform directory, which keeps tests away from
/// the real user configuration.
pub fn get_config_file_path(dir_override: Option<&Path>) -> Option<PathBuf> {
    resolve_directory(dir_override).map(|dir| dir.join(CONFIG_FILE))
}

fn resolve_directory(dir_override: Option<&Path>) -> Option<PathBuf> {
    match dir_override {
        Some(dir) => Some(dir.to_path_buf()),
        None => get_config_directory(),
    }
}

/// Loads the application configuration from the config file.
/// If the file doesn't exist, it creates a default one.
/// If the file is corrupted or cannot be parsed, it logs a warning
/// and falls back to the default configuration.
pub fn load_config(dir_override: Option<&Path>) -> Result<AppConfig> {
    let config_path = get_config_file_path(dir_override)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if !config_path.exists() {
        tracing::info!(
            "Config file not found, creating default config at {:?}",
            config_path
        );
        let default_config = AppConfig::default();
        save_config(&default_config, dir_override)?;
        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path)?;

    match serde_json::from_str::<AppConfig>(&config_content) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", config_path);
            Ok(config.normalized())
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            Ok(AppConfig::default())
        }
    }
}

/// Saves the provided configuration to the config file.
pub fn save_config(config: &AppConfig, dir_override: Option<&Path>) -> Result<()> {
    let config_dir = resolve_directory(dir_override)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
        tracing::info!("Created config directory: {:?}", config_dir);
    }

    let config_path = config_dir.join(CONFIG_FILE);
    let config_json = serde_json::to_string_pretty(config)?;

    fs::write(&config_path, config_json)?;
    tracing::info!("Saved config to {:?}", config_path);

    Ok(())
}

/// Exports the current configuration to a user-specified JSON file.
pub fn export_config(config: &AppConfig, export_path: &Path) -> Result<()> {
    let config_json = serde_json::to_string_pretty(config)?;
    fs::write(export_path, config_json)?;
    tracing::info!("Exported config to {:?}", export_path);
    Ok(())
}

/// Imports an application configuration from a user-specified JSON file.
///
/// The file must hold a JSON object. Missing keys take their defaults, but any
/// other JSON value is rejected instead of silently importing the defaults.
pub fn import_config(import_path: &Path) -> Result<AppConfig> {
    let config_content = fs::read_to_string(import_path)?;
    let value: Value = serde_json::from_str(&config_content)?;
    if !value.is_object() {
        anyhow::bail!("Config in {:?} is not a JSON object", import_path);
    }
    let config = serde_json::from_value::<AppConfig>(value)?;
    tracing::info!("Imported config from {:?}", import_path);
    Ok(config.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeMatch;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default_when_missing() {
        let dir = tempdir().unwrap();

        let config = load_config(Some(dir.path())).unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_save_then_load_keeps_directories() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            last_source_directory: Some(PathBuf::from("/photos")),
            last_target_directory: Some(PathBuf::from("/backup")),
            time_match: TimeMatch::After,
            ..Default::default()
        };

        save_config(&config, Some(dir.path())).unwrap();
        let loaded = load_config(Some(dir.path())).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();

        let config = load_config(Some(dir.path())).unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_import_rejects_non_object_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("array.json");
        for content in ["[]", "null", "42", "\"page_size\""] {
            fs::write(&path, content).unwrap();
            assert!(import_config(&path).is_err(), "accepted {content}");
        }
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"page_size\": ").unwrap();

        assert!(import_config(&path).is_err());
    }

    #[test]
    fn test_import_of_partial_object_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "page_size": 5 }"#).unwrap();

        let config = import_config(&path).unwrap();

        assert_eq!(config.page_size, 5);
        assert_eq!(config.scan_progress_interval, AppConfig::default().scan_progress_interval);
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exported.json");
        let config = AppConfig {
            page_size: 7,
            ..Default::default()
        };

        export_config(&config, &path).unwrap();

        assert_eq!(import_config(&path).unwrap(), config);
    }
}
