//! Process configuration read from the environment (`.env` honored).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub catalog_path: PathBuf,
    pub category_table_path: Option<PathBuf>,
    pub currency: String,
    pub nats_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: 8083, catalog_path: PathBuf::from("catalog.json"), category_table_path: None, currency: "CLP".into(), nats_url: None }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar { key: "PORT", value: raw })?,
            None => defaults.port,
        };
        Ok(Self {
            port,
            catalog_path: var("CATALOG_PATH").map(PathBuf::from).unwrap_or(defaults.catalog_path),
            category_table_path: var("CATEGORY_TABLE_PATH").map(PathBuf::from),
            currency: var("CURRENCY").map(|c| c.to_uppercase()).unwrap_or(defaults.currency),
            nats_url: var("NATS_URL"),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidVar { key: &'static str, value: String },
    #[error("config file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Malformed(#[from] serde_json::Error),
}
