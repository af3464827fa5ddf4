//! Stockfish engine wrapper using UCI protocol (blocking I/O)

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use chess_core::position::full_fen;
use chess_puzzler::classify::Oracle;
use chess_puzzler::{OracleError, Score};
use shakmaty::Chess;
use tracing::debug;

use crate::config::EngineOptions;

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    searches: u64,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub fn spawn(path: &str, options: EngineOptions) -> Result<Self, OracleError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| OracleError::Protocol("engine stdin was not captured".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| OracleError::Protocol("engine stdout was not captured".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            searches: 0,
        };

        engine.send("uci")?;
        engine.wait_for("uciok")?;

        engine.send(&format!("setoption name Threads value {}", options.threads))?;
        engine.send(&format!("setoption name Hash value {}", options.hash_mb))?;
        engine.send("isready")?;
        engine.wait_for("readyok")?;

        Ok(engine)
    }

    /// Searches run so far
    pub fn searches(&self) -> u64 {
        self.searches
    }

    fn send(&mut self, cmd: &str) -> Result<(), OracleError> {
        debug!(cmd, "SF <");
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn wait_for(&mut self, expected: &str) -> Result<(), OracleError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(OracleError::EngineExited {
                    waiting_for: expected.to_string(),
                });
            }
            let trimmed = line.trim();
            debug!(line = trimmed, "SF >");
            if trimmed == expected {
                return Ok(());
            }
        }
    }

    /// Send quit command and wait for process to exit
    pub fn quit(mut self) {
        let _ = self.send("quit");
        let _ = self.process.wait();
    }
}

impl Oracle for StockfishEngine {
    fn evaluate(&mut self, position: &Chess, depth: u32) -> Result<Score, OracleError> {
        let fen = full_fen(position);

        // Sync before each search so stale output never leaks into this one
        self.send("isready")?;
        self.wait_for("readyok")?;

        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go depth {depth}"))?;
        self.searches += 1;

        read_search(&mut self.stdout, &fen)
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

/// Read search output up to `bestmove`. The last reported score wins.
fn read_search<R: BufRead>(reader: &mut R, fen: &str) -> Result<Score, OracleError> {
    let mut score = None;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(OracleError::EngineExited {
                waiting_for: "bestmove".to_string(),
            });
        }
        let trimmed = line.trim();

        if trimmed.starts_with("info") && trimmed.contains(" score ") {
            if let Some(latest) = Score::from_uci(parse_cp(trimmed), parse_mate(trimmed)) {
                score = Some(latest);
            }
        } else if trimmed.starts_with("bestmove") {
            debug!(line = trimmed, "SF >");
            break;
        }
    }

    score.ok_or_else(|| OracleError::MissingScore {
        fen: fen.to_string(),
    })
}

/// Value following `key` on an info line
fn field_after(line: &str, key: &str) -> Option<i32> {
    let mut parts = line.split_whitespace();
    parts.find(|part| *part == key)?;
    parts.next()?.parse().ok()
}

fn parse_cp(line: &str) -> Option<i32> {
    field_after(line, "cp")
}

fn parse_mate(line: &str) -> Option<i32> {
    field_after(line, "mate")
}
