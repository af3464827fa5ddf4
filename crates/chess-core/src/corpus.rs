//! PGN corpus scanning.
//!
//! Replays the mainline of every game and keeps the positions that are past
//! the opening and still have enough material on the board. Games that do not
//! replay cleanly are reported as malformed and skipped by the caller.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use pgn_reader::{RawTag, Reader, SanPlus, Visitor};
use shakmaty::{Chess, Position};
use tracing::debug;

use crate::error::CorpusError;
use crate::position::{parse_position, piece_count};

const DEFAULT_OPENING_SKIP_PLIES: usize = 10;
const DEFAULT_MIN_PIECES: usize = 12;

/// Which replayed positions are handed on for mining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Positions after fewer plies than this are opening theory.
    pub opening_skip_plies: usize,
    /// Positions with fewer pieces (kings included) are skipped.
    pub min_pieces: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            opening_skip_plies: DEFAULT_OPENING_SKIP_PLIES,
            min_pieces: DEFAULT_MIN_PIECES,
        }
    }
}

impl ScanOptions {
    fn accepts(&self, ply: usize, position: &Chess) -> bool {
        ply >= self.opening_skip_plies && piece_count(position) >= self.min_pieces
    }
}

/// A position reached in a game, `ply` half-moves after the start.
#[derive(Debug, Clone)]
pub struct ScannedPosition {
    pub ply: usize,
    pub position: Chess,
}

#[derive(Debug, Clone)]
pub struct ScannedGame {
    /// 1-based index of the game in the corpus.
    pub number: usize,
    pub white: String,
    pub black: String,
    /// Total plies replayed from the mainline.
    pub plies: usize,
    pub positions: Vec<ScannedPosition>,
}

#[derive(Debug, Clone)]
pub struct MalformedGame {
    pub number: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub enum CorpusEntry {
    Game(ScannedGame),
    Malformed(MalformedGame),
}

/// Headers we care about.
#[derive(Default)]
struct GameTags {
    white: Option<String>,
    black: Option<String>,
    fen: Option<String>,
}

/// State during movetext parsing.
struct GameState {
    board: Chess,
    ply: usize,
    white: String,
    black: String,
    positions: Vec<ScannedPosition>,
}

type GameResult = Result<ScannedGame, MalformedGame>;

/// Visitor that replays one game at a time.
struct GameScanner {
    options: ScanOptions,
    /// Number assigned to the game currently being read.
    number: usize,
}

impl GameScanner {
    fn malformed(&self, reason: String) -> MalformedGame {
        MalformedGame {
            number: self.number,
            reason,
        }
    }
}

impl Visitor for GameScanner {
    type Tags = GameTags;
    type Movetext = GameState;
    type Output = GameResult;

    fn begin_tags(&mut self) -> ControlFlow<GameResult, GameTags> {
        self.number += 1;
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(&mut self, tags: &mut GameTags, name: &[u8], value: RawTag<'_>) -> ControlFlow<GameResult> {
        match name {
            b"White" => tags.white = Some(value.decode_utf8_lossy().into_owned()),
            b"Black" => tags.black = Some(value.decode_utf8_lossy().into_owned()),
            b"FEN" => tags.fen = Some(value.decode_utf8_lossy().into_owned()),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: GameTags) -> ControlFlow<GameResult, GameState> {
        let board = match tags.fen {
            Some(fen) => match parse_position(&fen) {
                Ok(board) => board,
                Err(e) => return ControlFlow::Break(Err(self.malformed(e.to_string()))),
            },
            None => Chess::default(),
        };

        ControlFlow::Continue(GameState {
            board,
            ply: 0,
            white: tags.white.unwrap_or_else(|| "?".to_string()),
            black: tags.black.unwrap_or_else(|| "?".to_string()),
            positions: Vec::new(),
        })
    }

    fn san(&mut self, state: &mut GameState, san_plus: SanPlus) -> ControlFlow<GameResult> {
        let mv = match san_plus.san.to_move(&state.board) {
            Ok(mv) => mv,
            Err(e) => {
                let reason = format!("illegal move {} at ply {}: {e}", san_plus, state.ply + 1);
                return ControlFlow::Break(Err(self.malformed(reason)));
            }
        };

        state.board.play_unchecked(mv);
        state.ply += 1;

        if self.options.accepts(state.ply, &state.board) {
            state.positions.push(ScannedPosition {
                ply: state.ply,
                position: state.board.clone(),
            });
        }

        ControlFlow::Continue(())
    }

    fn end_game(&mut self, state: GameState) -> GameResult {
        Ok(ScannedGame {
            number: self.number,
            white: state.white,
            black: state.black,
            plies: state.ply,
            positions: state.positions,
        })
    }
}

/// Lazy, non-restartable sequence of games from one or more PGN sources.
pub struct Corpus {
    pending: VecDeque<PathBuf>,
    current: Option<(PathBuf, Reader<Box<dyn Read>>)>,
    scanner: GameScanner,
}

impl Corpus {
    /// Open a corpus from a `.pgn` file or a directory of `.pgn` files.
    pub fn open(path: &Path, options: ScanOptions) -> Result<Self, CorpusError> {
        let files = resolve_pgn_files(path)?;
        debug!(files = files.len(), path = %path.display(), "Corpus resolved");
        Ok(Self {
            pending: files.into(),
            current: None,
            scanner: GameScanner { options, number: 0 },
        })
    }

    /// Scan PGN text from any reader (used for in-memory corpora).
    pub fn from_reader<R: Read + 'static>(reader: R, options: ScanOptions) -> Self {
        let source: Box<dyn Read> = Box::new(reader);
        Self {
            pending: VecDeque::new(),
            current: Some((PathBuf::from("<memory>"), Reader::new(source))),
            scanner: GameScanner { options, number: 0 },
        }
    }

    fn open_next(&mut self) -> Result<bool, CorpusError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(false);
        };
        let file = File::open(&path).map_err(|source| CorpusError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Reading PGN file");
        let source: Box<dyn Read> = Box::new(BufReader::new(file));
        self.current = Some((path, Reader::new(source)));
        Ok(true)
    }
}

impl Iterator for Corpus {
    type Item = Result<CorpusEntry, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                match self.open_next() {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(e) => return Some(Err(e)),
                }
            }

            let (path, reader) = self.current.as_mut()?;
            match reader.read_game(&mut self.scanner) {
                Ok(Some(Ok(game))) => return Some(Ok(CorpusEntry::Game(game))),
                Ok(Some(Err(malformed))) => {
                    debug!(game = malformed.number, reason = %malformed.reason, "Skipping malformed game");
                    return Some(Ok(CorpusEntry::Malformed(malformed)));
                }
                Ok(None) => self.current = None,
                Err(source) => {
                    let path = path.clone();
                    self.current = None;
                    return Some(Err(CorpusError::Io { path, source }));
                }
            }
        }
    }
}

/// Expand a corpus path into the PGN files to read, in a stable order.
pub fn resolve_pgn_files(path: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    if !path.exists() {
        return Err(CorpusError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let pattern = format!("{}/*.pgn", path.display());
    let mut files = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
    if files.is_empty() {
        return Err(CorpusError::NoPgnFiles(path.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Count games by their `[Event ` header lines. Only used for progress output.
pub fn count_games(files: &[PathBuf]) -> Result<usize, CorpusError> {
    let mut count = 0;
    for path in files {
        let file = File::open(path).map_err(|source| CorpusError::Io {
            path: path.clone(),
            source,
        })?;
        for line in BufReader::new(file).split(b'\n') {
            let line = line.map_err(|source| CorpusError::Io {
                path: path.clone(),
                source,
            })?;
            if line.starts_with(b"[Event ") {
                count += 1;
            }
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const OPERA_GAME: &str = r#"[Event "Paris"]
[White "Paul Morphy"]
[Black "Duke Karl / Count Isouard"]
[Result "1-0"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 4. dxe5 Bxf3 5. Qxf3 dxe5 6. Bc4 Nf6 7. Qb3 Qe7
8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5 11. Bxb5+ Nbd7 12. O-O-O Rd8 13. Rxd7 Rxd7
14. Rd1 Qe6 15. Bxd7+ Nxd7 16. Qb8+ Nxb8 17. Rd8# 1-0

"#;

    fn scan(pgn: &str, options: ScanOptions) -> Vec<CorpusEntry> {
        Corpus::from_reader(Cursor::new(pgn.as_bytes().to_vec()), options)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn game(entry: &CorpusEntry) -> &ScannedGame {
        match entry {
            CorpusEntry::Game(g) => g,
            CorpusEntry::Malformed(m) => panic!("unexpected malformed game: {}", m.reason),
        }
    }

    #[test]
    fn test_skips_opening_plies() {
        let entries = scan(OPERA_GAME, ScanOptions { opening_skip_plies: 10, min_pieces: 2 });
        assert_eq!(entries.len(), 1);
        let g = game(&entries[0]);
        assert_eq!(g.white, "Paul Morphy");
        assert_eq!(g.plies, 33);
        assert_eq!(g.positions.first().map(|p| p.ply), Some(10));
        assert_eq!(g.positions.len(), 24);
    }

    #[test]
    fn test_piece_floor_drops_positions() {
        let entries = scan(OPERA_GAME, ScanOptions { opening_skip_plies: 0, min_pieces: 33 });
        assert!(game(&entries[0]).positions.is_empty());

        let entries = scan(OPERA_GAME, ScanOptions { opening_skip_plies: 0, min_pieces: 28 });
        assert!(game(&entries[0])
            .positions
            .iter()
            .all(|p| piece_count(&p.position) >= 28));
    }

    #[test]
    fn test_malformed_game_is_reported_and_scanning_continues() {
        let pgn = format!(
            "[Event \"Broken\"]\n\n1. e4 e5 2. Ke3 Nc6 *\n\n{OPERA_GAME}"
        );
        let entries = scan(&pgn, ScanOptions::default());
        assert_eq!(entries.len(), 2);
        match &entries[0] {
            CorpusEntry::Malformed(m) => {
                assert_eq!(m.number, 1);
                assert!(m.reason.contains("Ke3"));
            }
            CorpusEntry::Game(_) => panic!("expected malformed game"),
        }
        assert_eq!(game(&entries[1]).number, 2);
    }

    #[test]
    fn test_fen_header_sets_start_position() {
        let pgn = r#"[Event "Endgame"]
[SetUp "1"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"]

1. e4 Kd7 2. e5 Ke6 *

"#;
        let entries = scan(pgn, ScanOptions { opening_skip_plies: 1, min_pieces: 2 });
        let g = game(&entries[0]);
        assert_eq!(g.plies, 4);
        assert_eq!(g.positions.len(), 4);
    }

    #[test]
    fn test_bad_fen_header_is_malformed() {
        let pgn = "[Event \"Bad\"]\n[FEN \"8/8/8/8/8/8/8/8 w - - 0 1\"]\n\n1. e4 *\n\n";
        let entries = scan(pgn, ScanOptions::default());
        assert!(matches!(entries[0], CorpusEntry::Malformed(_)));
    }

    #[test]
    fn test_missing_corpus_path() {
        let err = resolve_pgn_files(Path::new("/definitely/not/here.pgn")).unwrap_err();
        assert!(matches!(err, CorpusError::NotFound(_)));
    }
}
