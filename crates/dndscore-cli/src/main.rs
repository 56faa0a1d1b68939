//! DnDScore CLI - Factuality scoring from the command line.

use clap::Parser;
use dndscore_cli::commands;
use dndscore_cli::config::load_bleached_claims;
use dndscore_cli::{Cli, Command, Config, Formatter};
use dndscore_pipeline::{Pipeline, Services};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> dndscore_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // An explicit --config must exist; the default location is optional
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load(&config_path, cli.config.is_some())?;
    if let Some(path) = &cli.bleached_claims {
        config.scoring.bleached_claims = load_bleached_claims(path)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Config(args) => commands::execute_config(args, &config, &config_path, &formatter),
        Command::Score(args) => {
            let pipeline = start_pipeline(&config)?;
            let result = commands::execute_score(args, &pipeline, &formatter).await;
            pipeline.shutdown().await;
            result
        }
        Command::Batch(args) => {
            let pipeline = start_pipeline(&config)?;
            let result = commands::execute_batch(args, &pipeline, &formatter).await;
            pipeline.shutdown().await;
            result
        }
    }
}

/// Build the pipeline and cancel it on Ctrl-C.
fn start_pipeline(config: &Config) -> dndscore_cli::Result<Arc<Pipeline>> {
    let services = Services::from_config(&config.services)?;
    let pipeline = Arc::new(Pipeline::new(services, config.scoring.clone())?);

    let handle = pipeline.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling in-flight passages");
            handle.trigger();
        }
    });

    Ok(pipeline)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
