//! Tactical puzzle miner
//!
//! Scans a PGN corpus, classifies checks and captures with Stockfish (or by
//! simple density) and writes difficulty-tiered puzzles as JSON.

use tracing::info;

use puzzle_worker::config::WorkerConfig;
use puzzle_worker::runner;

fn main() -> anyhow::Result<()> {
    // Load .env file before the filter reads RUST_LOG
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut config = WorkerConfig::load()?;
    config.apply_args(std::env::args().skip(1))?;
    info!(
        pgn = %config.pgn_path.display(),
        out = %config.output_path.display(),
        classifier = %config.classifier,
        "Config loaded"
    );

    let summary = runner::run(&config)?;
    println!("{summary}");
    Ok(())
}
