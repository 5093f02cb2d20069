use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub store: StoreConfig,

    pub source: SourceConfig,

    pub visibility: VisibilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_path: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:icosync.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub user_agent: String,
    /// Pause between page fetches, to stay polite with the source site.
    pub request_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            user_agent: "icosync/0.1".to_string(),
            request_delay_ms: 500,
        }
    }
}

/// Process-wide content-visibility flags. These are resolved into
/// explicit filter arguments by the CLI before any core call; the
/// aggregation layer never reads them directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VisibilityConfig {
    pub adult_enabled: bool,
    pub explicit_enabled: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("ICOSYNC_CONFIG") {
            return Self::load_from_path(Path::new(&path));
        }

        for path in Self::config_paths() {
            if path.exists() {
                info!("loading config from: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        info!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("icosync").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.database_path.is_empty() {
            anyhow::bail!("store.database_path cannot be empty");
        }

        if self.store.max_connections == 0 {
            anyhow::bail!("store.max_connections must be > 0");
        }

        if self.store.min_connections > self.store.max_connections {
            anyhow::bail!("store.min_connections cannot exceed store.max_connections");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn zero_pool_is_rejected() {
        let mut config = Config::default();
        config.store.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[visibility]\nadult_enabled = true\n").unwrap();
        assert!(config.visibility.adult_enabled);
        assert!(!config.visibility.explicit_enabled);
        assert_eq!(config.general.log_level, "info");
    }
}
