use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use adaptive_snake::game::GameConfig;
use adaptive_snake::modes::{HumanMode, HumanModeOptions};

#[derive(Parser)]
#[command(name = "adaptive_snake")]
#[command(version, about = "Snake that adapts to how you play")]
struct Cli {
    /// Grid width (overrides the config file)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height (overrides the config file)
    #[arg(long)]
    height: Option<usize>,

    /// TOML game configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file the adaptive profile is loaded from and saved to
    #[arg(long)]
    state: Option<PathBuf>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let mut config = match &cli.config {
        Some(path) => GameConfig::load_or_default(path),
        None => GameConfig::default(),
    };
    if let Some(width) = cli.width {
        config.grid_width = width;
    }
    if let Some(height) = cli.height {
        config.grid_height = height;
    }
    if cli.seed.is_some() {
        config.adaptive.seed = cli.seed;
    }

    let options = HumanModeOptions {
        state_path: cli.state,
    };

    let mut human_mode = HumanMode::new(config, options);
    human_mode.run().await?;

    Ok(())
}

/// Log to a file; the terminal belongs to the game
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
        }
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create log file: {:?}", path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("Failed to install logger: {err}"))
}
