use dashmap::DashMap;
use std::env;
use std::sync::Arc;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Key/value configuration seeded from the process environment
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Snapshot of the current environment variables
    pub fn from_env() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    /// Empty configuration, independent of the environment
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

/// Listen address settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Read `HOST` and `PORT`, falling back to `0.0.0.0:3000`
    ///
    /// An unparsable port is logged and replaced by the default.
    pub fn from_config(config: &ConfigService) -> Self {
        let host = config.get_or("HOST", DEFAULT_HOST);
        let port = match config.get("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(port = %raw, "Invalid PORT, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };
        Self { host, port }
    }

    pub fn from_env() -> Self {
        Self::from_config(&ConfigService::from_env())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_config(&ConfigService::empty());
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_server_config_overrides() {
        let config = ConfigService::empty();
        config.set("HOST", "127.0.0.1");
        config.set("PORT", "8080");
        assert_eq!(ServerConfig::from_config(&config).address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = ConfigService::empty();
        config.set("PORT", "eighty");
        assert_eq!(ServerConfig::from_config(&config).port, 3000);
    }
}
