//! # Tumble
//!
//! Drop spheres and boxes onto a floor, watch them bounce and hear them
//! land. Spawn more from the debug panel (or keys `1`, `2`) and clear them
//! with `R`. WGSL files under `shaders/` are hot-reloaded while the window
//! is open.
//!
//! `--headless` skips the window and audio and simulates a fixed number of
//! frames, which is handy for checking configs.

mod app;
mod watcher;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tumble", version, about)]
pub struct Args {
    /// JSON playground config; every field is optional
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the hit sound and environment map
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    /// Seed for random spawns and hit volumes
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the hit sound
    #[arg(long)]
    pub mute: bool,

    /// Run without a window
    #[arg(long)]
    pub headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 600)]
    pub frames: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    app::run(&args)
}
