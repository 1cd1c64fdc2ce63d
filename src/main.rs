#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use aligntool::{Cli, Config, app};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let path = shellexpand::tilde(&path.to_string_lossy()).to_string();
            aligntool::config::load_from_path(Path::new(&path))?
        }
        None => Config::load_or_init()?,
    };

    // Logs go to stderr so command output on stdout stays clean.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(config.observability.log_level))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    app::dispatch(cli, config).await
}
