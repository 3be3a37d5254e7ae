use std::path::{Path, PathBuf};

use keystretch_core::KdfCost;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::constants::DEFAULT_POLL_INTERVAL_MS;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeystretchConfig {
    #[serde(default)]
    pub kdf: KdfCost,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UiSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

/// Resolve the config file path: `--config` / KEYSTRETCH_CONFIG, then the XDG default.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(value) = cli.config.as_deref() {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config, falling back to defaults when no file exists.
pub fn load_config(path: &Path) -> anyhow::Result<KeystretchConfig> {
    if !path.exists() {
        return Ok(KeystretchConfig::default());
    }
    let config = read_config(path)?;
    config
        .kdf
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid [kdf] section in {}: {}", path.display(), e))?;
    Ok(config)
}

pub fn read_config(path: &Path) -> anyhow::Result<KeystretchConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &KeystretchConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("keystretch"));
        }
    }
    Ok(home_dir()?.join(".config").join("keystretch"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.kdf, KdfCost::default());
        assert_eq!(config.ui.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = KeystretchConfig::default();
        config.kdf.rounds = 12;
        config.ui.poll_interval_ms = 25;
        write_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.kdf.rounds, 12);
        assert_eq!(loaded.ui.poll_interval_ms, 25);
    }

    #[test]
    fn test_partial_kdf_section_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[kdf]\nmemory_kib = 1024\n").unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.kdf.memory_kib, 1024);
        assert_eq!(loaded.kdf.rounds, KdfCost::default().rounds);
        assert_eq!(loaded.ui.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[kdf]\nrounds = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid [kdf] section"));
    }

    #[test]
    fn test_garbage_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
