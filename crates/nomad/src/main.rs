//! NOMAD headless runner.
//!
//! ```text
//! nomad --config nomad.toml --frames 600
//! RUST_LOG=nomad=debug nomad --squares 4
//! ```

use std::path::PathBuf;

use clap::Parser;
use nomad::{Game, GameConfig, GameError, HeadlessBackend, ScriptedInput};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Frames rendered when neither the config nor the command line sets a limit.
const DEFAULT_HEADLESS_FRAMES: u64 = 600;

/// Command line parameters
#[derive(Debug, Parser)]
#[command(name = "nomad", version, about)]
struct Args {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Stop after this many frames.
    #[arg(long, short = 'f')]
    frames: Option<u64>,

    /// Number of squares to spawn.
    #[arg(long)]
    squares: Option<usize>,
}

fn main() -> Result<(), GameError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nomad=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            GameConfig::load(path)?
        }
        None => GameConfig::default(),
    };
    if let Some(squares) = args.squares {
        config.squares = squares;
    }
    let frames = args
        .frames
        .or(config.max_frames)
        .unwrap_or(DEFAULT_HEADLESS_FRAMES);
    config.max_frames = Some(frames);

    let mut game = Game::new(config, HeadlessBackend::new(), ScriptedInput::demo(frames))?;
    game.init()?;
    let rendered = game.run()?;

    info!(
        frames = rendered,
        draws = game.backend().total_draws(),
        "Headless run finished"
    );
    Ok(())
}
