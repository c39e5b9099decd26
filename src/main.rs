mod canvas;
mod config;
mod error;
mod game;
mod input;
mod render;
mod scheduler;
mod session;
mod snake;
mod state;
mod term;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use config::{GameConfig, LogConfig, Overrides};

pub type TermInt = u16;
pub type Coords = (u16, u16);

#[derive(Parser)]
#[command(name = "gridsnake")]
#[command(version, about = "Snake on a square grid, drawn in the terminal")]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells per side of the board
    #[arg(long)]
    grid_size: Option<u16>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "gridsnake=trace"
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(log: &LogConfig) -> Result<()> {
    let Some(path) = &log.file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(log.filter()?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        grid_size: cli.grid_size,
        seed: cli.seed,
        log_file: cli.log_file,
        log_level: cli.log_level,
    };
    let config = GameConfig::resolve(cli.config.as_deref(), overrides)?;
    init_logging(&config.log)?;
    info!(?config, "starting");

    let mut game = game::SnakeGame::new(&config)?;
    // The game loop restores the terminal before returning, error or not
    game.play()
}
