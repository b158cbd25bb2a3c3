use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::cart::DEFAULT_CART_KEY;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// JSON files under `data_dir`.
    File,
    /// Local SQLite file at `database_path`.
    Sqlite,
    /// Remote Turso database.
    Turso,
    /// Nothing survives the process.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageMode,
    pub data_dir: PathBuf,
    pub database_path: String,
    pub turso_url: Option<String>,
    pub turso_token: Option<String>,
    pub cart_key: String,
    pub catalog_path: Option<PathBuf>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageMode::File,
            data_dir: PathBuf::from("data"),
            database_path: "data/vinilo.db".into(),
            turso_url: None,
            turso_token: None,
            cart_key: DEFAULT_CART_KEY.into(),
            catalog_path: None,
            port: 3001,
        }
    }
}

impl Config {
    /// Defaults overridden by `VINILO_*` environment variables
    /// (e.g. `VINILO_STORAGE=sqlite`, `VINILO_PORT=8080`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Env::prefixed("VINILO_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Validation("port cannot be 0".into()));
        }
        if self.cart_key.trim().is_empty() {
            return Err(ConfigError::Validation("cart_key cannot be empty".into()));
        }
        if self.storage == StorageMode::Turso
            && (self.turso_url.is_none() || self.turso_token.is_none())
        {
            return Err(ConfigError::Validation(
                "turso storage needs turso_url and turso_token".into(),
            ));
        }
        Ok(())
    }
}
