use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SynapticConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub graph: GraphConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GraphConfig {
    /// Confidence floor below which inferred types fall back to `related`.
    pub min_confidence: f64,
    /// Commit group size for batch insertion and reclassification.
    pub commit_interval: usize,
    /// Hop budget applied when a tool call omits `max_hops`.
    pub default_max_hops: u32,
}

impl Default for SynapticConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            graph: GraphConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_synaptic_dir()
            .join("graph.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            commit_interval: 500,
            default_max_hops: 2,
        }
    }
}

/// Returns `~/.synaptic/`
pub fn default_synaptic_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".synaptic")
}

/// Returns the default config file path: `~/.synaptic/config.toml`
pub fn default_config_path() -> PathBuf {
    default_synaptic_dir().join("config.toml")
}

impl SynapticConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            SynapticConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (SYNAPTIC_DB, SYNAPTIC_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SYNAPTIC_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("SYNAPTIC_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SynapticConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.graph.min_confidence, 0.6);
        assert_eq!(config.graph.commit_interval, 500);
        assert!(config.storage.db_path.ends_with("graph.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test-graph.db"

[graph]
min_confidence = 0.75
commit_interval = 100
"#;
        let config: SynapticConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test-graph.db");
        assert_eq!(config.graph.min_confidence, 0.75);
        assert_eq!(config.graph.commit_interval, 100);
        // defaults still apply for unset fields
        assert_eq!(config.graph.default_max_hops, 2);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = SynapticConfig::default();
        std::env::set_var("SYNAPTIC_DB", "/tmp/override.db");
        std::env::set_var("SYNAPTIC_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");

        // Clean up
        std::env::remove_var("SYNAPTIC_DB");
        std::env::remove_var("SYNAPTIC_LOG_LEVEL");
    }
}
