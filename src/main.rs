use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chessboard::config::Config;
use chessboard::gui;

/// A chessboard front-end driven by an external UCI engine.
#[derive(Parser)]
#[command(name = "chessboard")]
struct Args {
    /// Engine command line, e.g. "stockfish" or "python patfish.py".
    #[arg(long, default_value = "stockfish")]
    engine: String,

    /// Search depth handed to the engine with `go depth`.
    #[arg(long, default_value_t = 5)]
    depth: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    gui::run(Config::new(&args.engine, args.depth))?;
    Ok(())
}
