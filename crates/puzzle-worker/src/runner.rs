//! One mining run from configuration to puzzle file

use chess_core::corpus::{count_games, resolve_pgn_files};
use chess_core::{Corpus, CorpusEntry, CorpusError};
use chess_puzzler::classify::{Classifier, EngineClassifier};
use chess_puzzler::pipeline::{MiningStats, Miner};
use chess_puzzler::puzzle::selection::PuzzleCollection;
use chess_puzzler::tactics::density::DensityClassifier;
use chess_puzzler::MineError;
use tracing::{error, info};

use crate::config::{ClassifierKind, WorkerConfig};
use crate::error::WorkerError;
use crate::report::{write_puzzles, RunSummary};
use crate::stockfish::StockfishEngine;

/// Mine the configured corpus and write the puzzle file.
pub fn run(config: &WorkerConfig) -> Result<RunSummary, WorkerError> {
    config.check_paths()?;

    let files = resolve_pgn_files(&config.pgn_path)?;
    let total_games = count_games(&files)?;
    info!(
        path = %config.pgn_path.display(),
        files = files.len(),
        games = total_games,
        classifier = %config.classifier,
        target = config.miner.max_puzzles,
        "Starting mining run"
    );
    let corpus = Corpus::open(&config.pgn_path, config.scan)?;

    match config.classifier {
        ClassifierKind::Engine => {
            let engine = StockfishEngine::spawn(&config.stockfish_path, config.engine)
                .inspect_err(|e| {
                    error!(path = %config.stockfish_path, error = %e, "Failed to start Stockfish")
                })?;
            info!(
                path = %config.stockfish_path,
                base_depth = config.depths.base(),
                eval_depth = config.depths.eval(),
                "Stockfish ready"
            );
            let classifier = EngineClassifier::new(engine, config.policy, config.depths);
            let (outcome, collection, stats, classifier) =
                mine(classifier, corpus, config, Some(total_games));

            let engine = classifier.into_oracle();
            info!(searches = engine.searches(), "Stopping Stockfish");
            engine.quit();

            outcome?;
            finish(config, collection, stats)
        }
        ClassifierKind::Density => {
            let (outcome, collection, stats, _) =
                mine(DensityClassifier, corpus, config, Some(total_games));
            outcome?;
            finish(config, collection, stats)
        }
    }
}

/// Run the miner over any corpus with any classifier. Output is written only
/// when mining finished without error.
pub fn run_with<C, I>(
    config: &WorkerConfig,
    classifier: C,
    corpus: I,
) -> Result<(RunSummary, C), WorkerError>
where
    C: Classifier,
    I: IntoIterator<Item = Result<CorpusEntry, CorpusError>>,
{
    let (outcome, collection, stats, classifier) = mine(classifier, corpus, config, None);
    outcome?;
    let summary = finish(config, collection, stats)?;
    Ok((summary, classifier))
}

fn mine<C, I>(
    classifier: C,
    corpus: I,
    config: &WorkerConfig,
    total_games: Option<usize>,
) -> (Result<(), MineError>, PuzzleCollection, MiningStats, C)
where
    C: Classifier,
    I: IntoIterator<Item = Result<CorpusEntry, CorpusError>>,
{
    let mut miner = Miner::new(classifier, config.miner);
    if let Some(total) = total_games {
        miner = miner.with_total_games(total);
    }
    let outcome = miner.run(corpus);
    if let Err(e) = &outcome {
        error!(error = %e, accepted = miner.collection().len(), "Mining aborted, no output written");
    }
    let (collection, stats, classifier) = miner.finish();
    (outcome, collection, stats, classifier)
}

fn finish(
    config: &WorkerConfig,
    collection: PuzzleCollection,
    stats: MiningStats,
) -> Result<RunSummary, WorkerError> {
    let tiers = collection.tiers();
    let records = collection.into_records();
    write_puzzles(&config.output_path, &records)?;
    info!(
        path = %config.output_path.display(),
        puzzles = records.len(),
        "Puzzles written"
    );

    Ok(RunSummary {
        classifier: config.classifier,
        output_path: config.output_path.clone(),
        tiers,
        stats,
    })
}
