#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use chess_core::{Corpus, ScanOptions};
use chess_puzzler::classify::Oracle;
use chess_puzzler::{OracleError, Score};
use shakmaty::Chess;

/// Morphy vs Duke Karl / Count Isouard, Paris 1858.
pub const OPERA_GAME: &str = r#"[Event "Paris"]
[Site "Paris FRA"]
[Date "1858.??.??"]
[White "Paul Morphy"]
[Black "Duke Karl / Count Isouard"]
[Result "1-0"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 4. dxe5 Bxf3 5. Qxf3 dxe5 6. Bc4 Nf6 7. Qb3 Qe7
8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5 11. Bxb5+ Nbd7 12. O-O-O Rd8 13. Rxd7 Rxd7
14. Rd1 Qe6 15. Bxd7+ Nxd7 16. Qb8+ Nxb8 17. Rd8# 1-0

"#;

/// An illegal king move on ply 3.
pub const BROKEN_GAME: &str = r#"[Event "Broken"]
[White "A"]
[Black "B"]

1. e4 e5 2. Ke3 Nc6 *

"#;

/// In-memory corpus over PGN text.
pub fn corpus(pgn: &str, options: ScanOptions) -> Corpus {
    Corpus::from_reader(Cursor::new(pgn.as_bytes().to_vec()), options)
}

/// Generate a unique suffix based on timestamp to avoid collisions.
pub fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", std::process::id(), ts % 1_000_000_000)
}

/// A fresh path in the temp dir.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}", unique_suffix(), name))
}

/// Stand-in for the engine. `base` answers the baseline depth, `after`
/// answers the deeper search (opponent to move, so the opponent's view).
pub struct ScriptedOracle {
    pub base_depth: u32,
    pub base: Score,
    pub after: Score,
    pub calls: usize,
    /// Fail once this many calls have been answered.
    pub fail_after: Option<usize>,
}

impl ScriptedOracle {
    pub fn flat() -> Self {
        Self::new(Score::cp(0), Score::cp(0))
    }

    pub fn new(base: Score, after: Score) -> Self {
        Self {
            base_depth: 10,
            base,
            after,
            calls: 0,
            fail_after: None,
        }
    }
}

impl Oracle for ScriptedOracle {
    fn evaluate(&mut self, _position: &Chess, depth: u32) -> Result<Score, OracleError> {
        if self.fail_after.is_some_and(|limit| self.calls >= limit) {
            return Err(OracleError::EngineExited {
                waiting_for: "bestmove".to_string(),
            });
        }
        self.calls += 1;
        Ok(if depth == self.base_depth {
            self.base
        } else {
            self.after
        })
    }
}

/// Find a Stockfish binary next to the manifest or on PATH.
pub fn find_stockfish() -> Option<String> {
    if let Ok(path) = std::env::var("STOCKFISH_PATH") {
        if std::path::Path::new(&path).exists() {
            return Some(path);
        }
    }
    let local = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("stockfish");
    if local.exists() {
        return Some(local.to_string_lossy().into_owned());
    }
    if Command::new("stockfish")
        .arg("quit")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
    {
        return Some("stockfish".to_string());
    }
    None
}
