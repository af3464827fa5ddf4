//! Worker configuration from environment variables and command-line flags

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chess_core::ScanOptions;
use chess_puzzler::classify::{ClassificationPolicy, SearchDepths};
use chess_puzzler::pipeline::MinerOptions;
use chess_puzzler::puzzle::selection::SelectionRules;

use crate::error::WorkerError;

/// Which classification policy the run uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassifierKind {
    /// Stockfish decides which checks and captures are sound.
    Engine,
    /// Counts checks and captures, no engine needed.
    Density,
}

impl FromStr for ClassifierKind {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "engine" | "stockfish" => Ok(ClassifierKind::Engine),
            "density" => Ok(ClassifierKind::Density),
            other => Err(WorkerError::Config(format!(
                "unknown classifier '{other}' (expected 'engine' or 'density')"
            ))),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Engine => f.write_str("engine"),
            ClassifierKind::Density => f.write_str("density"),
        }
    }
}

/// UCI options sent once at engine startup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    pub threads: u32,
    pub hash_mb: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 256,
        }
    }
}

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// A `.pgn` file or a directory of them
    pub pgn_path: PathBuf,

    /// Stockfish binary, a path or a command on PATH
    pub stockfish_path: String,

    pub output_path: PathBuf,

    pub classifier: ClassifierKind,

    pub miner: MinerOptions,

    pub scan: ScanOptions,

    pub policy: ClassificationPolicy,

    pub depths: SearchDepths,

    pub engine: EngineOptions,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, WorkerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. Missing keys take defaults,
    /// present keys must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WorkerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let policy_defaults = ClassificationPolicy::default();
        let scan_defaults = ScanOptions::default();
        let miner_defaults = MinerOptions::default();
        let depth_defaults = SearchDepths::default();
        let engine_defaults = EngineOptions::default();

        let hopeless_score = match vars.get("HOPELESS_SCORE") {
            Some(v) if v.trim().eq_ignore_ascii_case("off") => None,
            Some(v) => Some(parse_value::<i32>("HOPELESS_SCORE", &v)?),
            None => policy_defaults.hopeless_score,
        };

        let policy = ClassificationPolicy {
            blunder_threshold: vars.parse("BAD_MOVE_THRESHOLD", policy_defaults.blunder_threshold)?,
            winning_score: vars.parse("WINNING_SCORE", policy_defaults.winning_score)?,
            losing_score: vars.parse("LOSING_SCORE", policy_defaults.losing_score)?,
            balanced_floor: vars.parse("BALANCED_FLOOR", policy_defaults.balanced_floor)?,
            hopeless_score,
            strict_win_check: match vars.get("STRICT_WIN_CHECK") {
                Some(v) => parse_bool("STRICT_WIN_CHECK", &v)?,
                None => policy_defaults.strict_win_check,
            },
        };

        let base_depth = vars.parse("BASE_DEPTH", depth_defaults.base())?;
        let eval_depth = vars.parse("EVAL_DEPTH", depth_defaults.eval())?;
        let depths = SearchDepths::new(base_depth, eval_depth).ok_or_else(|| {
            WorkerError::Config(format!(
                "EVAL_DEPTH ({eval_depth}) must be greater than BASE_DEPTH ({base_depth})"
            ))
        })?;

        let config = Self {
            pgn_path: vars.get("PGN_PATH").unwrap_or_else(|| "mega.pgn".to_string()).into(),
            stockfish_path: vars
                .get("STOCKFISH_PATH")
                .unwrap_or_else(|| "stockfish".to_string()),
            output_path: vars
                .get("OUTPUT_PATH")
                .unwrap_or_else(|| "puzzles.json".to_string())
                .into(),
            classifier: match vars.get("CLASSIFIER") {
                Some(v) => v.parse()?,
                None => ClassifierKind::Engine,
            },
            miner: MinerOptions {
                max_puzzles: vars.parse("MAX_PUZZLES", miner_defaults.max_puzzles)?,
                selection: SelectionRules {
                    min_total_targets: vars
                        .parse("MIN_TOTAL_TARGETS", miner_defaults.selection.min_total_targets)?,
                },
            },
            scan: ScanOptions {
                opening_skip_plies: vars
                    .parse("OPENING_SKIP_PLIES", scan_defaults.opening_skip_plies)?,
                min_pieces: vars.parse("MIN_PIECES", scan_defaults.min_pieces)?,
            },
            policy,
            depths,
            engine: EngineOptions {
                threads: vars.parse("ENGINE_THREADS", engine_defaults.threads)?,
                hash_mb: vars.parse("ENGINE_HASH_MB", engine_defaults.hash_mb)?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply `--pgn`, `--stockfish`, `--out`, `--max-puzzles` and
    /// `--classifier` on top of the environment. Accepts `--flag value` and
    /// `--flag=value`.
    pub fn apply_args<I>(&mut self, args: I) -> Result<(), WorkerError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            let mut value = || {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| WorkerError::Config(format!("{flag} needs a value")))
            };

            match flag.as_str() {
                "--pgn" => self.pgn_path = value()?.into(),
                "--stockfish" => self.stockfish_path = value()?,
                "--out" => self.output_path = value()?.into(),
                "--max-puzzles" => self.miner.max_puzzles = parse_value("--max-puzzles", &value()?)?,
                "--classifier" => self.classifier = value()?.parse()?,
                other => {
                    return Err(WorkerError::Config(format!("unknown argument '{other}'")));
                }
            }
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), WorkerError> {
        if self.miner.max_puzzles == 0 {
            return Err(WorkerError::Config("MAX_PUZZLES must be at least 1".into()));
        }
        if self.engine.threads == 0 {
            return Err(WorkerError::Config("ENGINE_THREADS must be at least 1".into()));
        }
        Ok(())
    }

    /// Startup checks: the corpus must exist, and in engine mode so must an
    /// engine given as a path. Bare command names are left to the spawn.
    pub fn check_paths(&self) -> Result<(), WorkerError> {
        if !self.pgn_path.exists() {
            return Err(WorkerError::Config(format!(
                "PGN path not found: {}",
                self.pgn_path.display()
            )));
        }
        if self.classifier == ClassifierKind::Engine {
            let engine = Path::new(&self.stockfish_path);
            if engine.components().count() > 1 && !engine.exists() {
                return Err(WorkerError::Config(format!(
                    "Stockfish not found at {}",
                    self.stockfish_path
                )));
            }
        }
        Ok(())
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, WorkerError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(key) {
            Some(v) => parse_value(key, &v),
            None => Ok(default),
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, WorkerError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| WorkerError::Config(format!("{key}='{raw}': {e}")))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, WorkerError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(WorkerError::Config(format!("{key}='{raw}': expected true or false"))),
    }
}
