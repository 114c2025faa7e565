use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::ranking::ScoringWeights;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "product-match.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite file holding the catalog and unknown-product log
    pub database: String,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    pub weights: ScoringWeights,
    pub server: ServerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database: "products.db".to_string(),
            log_filter: "product_match_engine=info".to_string(),
            weights: ScoringWeights::default(),
            server: ServerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
        }
    }
}

impl EngineConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if present, then
    /// apply `DB_PATH` / `PORT` from the environment and validate.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml(&fs::read_to_string(path)?)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml(&fs::read_to_string(DEFAULT_CONFIG_FILE)?)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.weights.validate()?;
        Ok(config)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Apply `DB_PATH` and `PORT` overrides; an unparsable port is ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = lookup("DB_PATH").filter(|p| !p.trim().is_empty()) {
            self.database = db_path;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
    }

    /// `host:port` for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchEngineError;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.database, "products.db");
        assert_eq!(config.weights, ScoringWeights::DEFAULT);
        assert_eq!(config.bind_addr(), "0.0.0.0:8090");
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml(
            r#"
            database = "shop.db"

            [weights]
            contains_bonus = 1.5

            [server]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.database, "shop.db");
        assert_eq!(config.weights.contains_bonus, 1.5);
        assert_eq!(config.weights.levenshtein, 1.5);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_malformed_toml() {
        let err = EngineConfig::from_toml("database = ").unwrap_err();
        assert!(matches!(err, MatchEngineError::ConfigParse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("DB_PATH", "/tmp/other.db"), ("PORT", "not-a-port")]
            .into_iter()
            .collect();
        let mut config = EngineConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database, "/tmp/other.db");
        assert_eq!(config.server.port, 8090);

        config.apply_overrides(|key| (key == "PORT").then(|| "7000".to_string()));
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.database, "/tmp/other.db");
    }

    #[test]
    fn test_load_file_rejects_negative_weight() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[weights]\nphonetic = -0.5").unwrap();

        let err = EngineConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, MatchEngineError::InvalidWeights(_)));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = EngineConfig::load(Some(Path::new("/nonexistent/product-match.toml"))).unwrap_err();
        assert!(matches!(err, MatchEngineError::Io(_)));
    }
}
