use clap::Parser;
use dicomviewer::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    dicomviewer::run(config).await
}
