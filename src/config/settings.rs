//! Application settings and paths.
//!
//! Settings live in a JSON file under the XDG config directory
//! (`~/.config/skulk/settings.json` on Linux). Every field has a default,
//! so a missing file or a partial one is fine.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{SeedTable, DEFAULT_CONCURRENCY};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/skulk)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve the platform directories. Nothing is created on disk.
    pub fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "skulk", "skulk").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Defaults that apply when the matching flag is not given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Connect timeout in seconds.
    pub default_timeout_secs: u64,
    /// Maximum simultaneous grabs.
    pub default_concurrency: usize,
    /// Attempts per port.
    pub default_retries: u32,
    /// Connection attempts per second, 0 for unlimited.
    pub default_max_rate: u32,
    /// Per-port seeds added to (or replacing) the built-in ones.
    /// An empty string disables the seed for that port.
    pub seeds: BTreeMap<u16, String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_timeout_secs: 5,
            default_concurrency: DEFAULT_CONCURRENCY,
            default_retries: 3,
            default_max_rate: 0,
            seeds: BTreeMap::new(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if absent.
    pub fn load() -> ConfigResult<Self> {
        let file = match Paths::new() {
            Ok(paths) => paths.settings_file(),
            // No home directory: nothing to load.
            Err(ConfigError::DirectoryNotFound) => return Ok(Self::default()),
            Err(e) => return Err(e),
        };

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> ConfigResult<()> {
        match self.seeds.keys().find(|&&port| port == 0) {
            Some(&port) => Err(ConfigError::InvalidSeedPort(port)),
            None => Ok(()),
        }
    }

    /// Built-in seeds with this file's overrides applied.
    pub fn seed_table(&self) -> SeedTable {
        SeedTable::default().with_overrides(
            self.seeds
                .iter()
                .map(|(&port, payload)| (port, payload.as_str())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_settings(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_timeout_secs, 5);
        assert_eq!(settings.default_concurrency, 100);
        assert_eq!(settings.default_retries, 3);
        assert_eq!(settings.default_max_rate, 0);
        assert_eq!(settings.seed_table(), SeedTable::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_settings(r#"{ "default_concurrency": 20 }"#);
        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.default_concurrency, 20);
        assert_eq!(settings.default_timeout_secs, 5);
    }

    #[test]
    fn test_seed_overrides() {
        let file = write_settings(
            r#"{ "seeds": { "21": "", "6379": "INFO\r\n", "3306": "\u0003SELECT 1;" } }"#,
        );
        let seeds = AppSettings::load_from(file.path()).unwrap().seed_table();
        assert_eq!(seeds.get(21), None);
        assert_eq!(seeds.get(6379), Some(&b"INFO\r\n"[..]));
        assert_eq!(seeds.get(3306), Some(&b"\x03SELECT 1;"[..]));
    }

    #[test]
    fn test_seed_port_zero_rejected() {
        let file = write_settings(r#"{ "seeds": { "0": "x" } }"#);
        let result = AppSettings::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidSeedPort(0))));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_settings("{ not json");
        let result = AppSettings::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppSettings::load_from(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::ReadFailed { .. })));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
