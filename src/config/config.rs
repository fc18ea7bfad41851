use crate::config::logging_config::LoggingConfig;
use crate::config::server_config::ServerConfig;
use crate::storage::StorageConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("bind port must be non-zero")]
    InvalidPort,

    #[error("invalid storage configuration: {0}")]
    InvalidStorage(String),
}

/// Top-level service configuration. Every section is optional.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Read and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        self.bind_addr()?;

        if self.storage.backend != "filesystem" {
            return Err(ConfigError::InvalidStorage(format!(
                "unknown backend '{}'",
                self.storage.backend
            )));
        }
        if let Some(path) = self.storage.options.get("path") {
            if !path.is_string() {
                return Err(ConfigError::InvalidStorage(
                    "storage.options.path must be a string".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Socket address the HTTP server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.server.bind_address.clone()))
    }
}
