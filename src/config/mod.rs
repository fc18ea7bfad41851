pub mod config;
pub mod logging_config;
pub mod server_config;

pub use config::{Config, ConfigError};
pub use logging_config::LoggingConfig;
pub use server_config::ServerConfig;

use clap::Parser;
use std::path::PathBuf;

/// Command line arguments for the viewer service.
#[derive(Debug, Parser)]
#[command(name = "dicomviewer", about = "Upload, inspect and render DICOM files over HTTP")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen port for the server, overrides the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Resolve the effective configuration from the arguments.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(port) = self.port {
            config.server.bind_port = port;
        }
        config.validate()?;
        Ok(config)
    }
}
