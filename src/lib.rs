//! DICOM viewer service.
//!
//! Stores uploaded DICOM files, serves their attributes as DICOM JSON and
//! renders their pixel data as 8-bit greyscale PNGs. Parsed datasets and
//! rendered images are cached per [`dicom::DicomFile`].

pub mod adapters;
pub mod config;
pub mod dicom;
pub mod storage;

use crate::adapters::http::HttpAdapter;
use crate::config::{Config, LoggingConfig};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true);

    let file_layer = if config.log_to_file {
        let file = std::fs::File::create(&config.log_file_path)?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;
    Ok(())
}

/// Run the service until Ctrl-C
pub async fn run(config: Config) -> anyhow::Result<()> {
    init_logging(&config.logging)?;

    tracing::info!("🔧 Starting DICOM viewer");

    let store = storage::create_file_store(&config.storage)?;
    tracing::info!("🗄️  File store: {:?}", store);

    let adapter = HttpAdapter::from_config(&config)?;
    tracing::info!("{}", adapter.summary());

    let shutdown = CancellationToken::new();
    let server = adapter.start(store, shutdown.clone()).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    shutdown.cancel();
    server.await?;

    Ok(())
}
