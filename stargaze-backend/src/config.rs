use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Fast-tier connection URL; an unreachable tier degrades the
    /// service to durable-store-only mode instead of failing startup
    #[serde(default = "default_fast_tier_url")]
    pub fast_tier_url: String,

    /// Path of the catalog document collection
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Time-to-live applied to every fast-tier key, re-armed on read
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_scrape_timeout_secs")]
    pub scrape_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8085
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_fast_tier_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_catalog_path() -> String {
    "data/constellations.json".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    20
}

fn default_scrape_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            fast_tier_url: default_fast_tier_url(),
            catalog_path: default_catalog_path(),
            cache_ttl_secs: default_cache_ttl_secs(),
            scrape_timeout_secs: default_scrape_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BackendConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: BackendConfig = toml::from_str("port = 9000").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.cache_ttl_secs, 20);
        assert_eq!(config.catalog_path, "data/constellations.json");
    }

    #[test]
    fn test_server_address() {
        let config = BackendConfig::default();
        assert_eq!(config.server_address(), "0.0.0.0:8085");
    }
}
