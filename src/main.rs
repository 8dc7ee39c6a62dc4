//! Light Maps - headless map browser
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{error, info};

use lmap_app::config::{config_path, init_config_dir};

/// Light Maps - browse places on an embedded map from the command line
#[derive(Parser, Debug)]
#[command(name = "lmap")]
#[command(about = "A minimal map browser driven over a message bridge", long_about = None)]
struct Args {
    /// Directory holding `.lmap/config.toml` (defaults to the current directory)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Directory for stored preferences, saved places and history
    #[arg(long, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let base_path = args
        .path
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if args.init {
        init_config_dir(&base_path)?;
        eprintln!("Wrote {}", config_path(&base_path).display());
        return Ok(());
    }

    // Logs go to a file, stdout carries NDJSON events
    lmap_core::logging::init()?;
    info!("Base path: {}", base_path.display());

    let result = light_maps::run_headless(&base_path, args.store_dir).await;
    if let Err(ref e) = result {
        error!("Application error: {:?}", e);
    }
    result?;
    Ok(())
}
