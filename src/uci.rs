//! Bridge to the external UCI engine.
//!
//! Move selection is delegated to a separate engine program. Each request
//! spawns one child process, runs the `uci`/`isready` handshake, asks for a
//! best move at fixed depth, then tells the engine to quit and reaps it.
//! The child is never reused across moves.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// What the engine answered for one `go depth` request.
#[derive(Debug, Clone)]
pub struct EngineReply {
    /// Best-move token in long algebraic notation, e.g. `e7e5`.
    pub best_move: String,
    /// Last centipawn score seen on an `info` line, as the engine sent it.
    pub score_cp: Option<i32>,
    /// Wall-clock time from spawn to `bestmove`.
    pub elapsed: Duration,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to spawn engine `{command}`: {source}")]
    Spawn { command: String, source: io::Error },
    #[error("engine closed its pipe before answering")]
    PipeClosed,
    #[error("i/o error while talking to the engine: {0}")]
    Io(#[from] io::Error),
    #[error("engine reported no playable move")]
    NoBestMove,
}

/// Asks the configured engine for a move in the given position.
pub fn request_move(config: &Config, fen: &str) -> Result<EngineReply, EngineError> {
    let started = Instant::now();
    let mut session = EngineSession::spawn(&config.engine_command)?;
    session.handshake()?;
    session.send(&format!("position fen {}", fen))?;
    session.send(&format!("go depth {}", config.search_depth))?;

    let mut score_cp = None;
    let best_move = loop {
        let line = session.read_line()?;
        if let Some(cp) = parse_score_cp(&line) {
            score_cp = Some(cp);
        }
        if let Some(token) = parse_bestmove(&line) {
            break token.to_string();
        }
        if line.starts_with("bestmove") {
            // `bestmove (none)`: the engine has nothing to play.
            return Err(EngineError::NoBestMove);
        }
    };

    let elapsed = started.elapsed();
    debug!(%best_move, ?score_cp, ?elapsed, "engine answered");
    Ok(EngineReply {
        best_move,
        score_cp,
        elapsed,
    })
}

/// Extracts the centipawn score from an `info` line, if it carries one.
/// `score mate` lines carry no centipawn value and are skipped.
pub fn parse_score_cp(line: &str) -> Option<i32> {
    if !line.starts_with("info") {
        return None;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let score = tokens.iter().position(|token| *token == "score")?;
    if tokens.get(score + 1) == Some(&"cp") {
        tokens.get(score + 2)?.parse().ok()
    } else {
        None
    }
}

/// Best-move token from a `bestmove` line; `(none)` yields no move.
pub fn parse_bestmove(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "bestmove" {
        return None;
    }
    match tokens.next() {
        Some("(none)") | None => None,
        Some(token) => Some(token),
    }
}

/// A spawned engine child with buffered pipes.
struct EngineSession {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl EngineSession {
    fn spawn(command: &[String]) -> Result<Self, EngineError> {
        let (program, args) = command.split_first().ok_or_else(|| EngineError::Spawn {
            command: String::new(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty engine command"),
        })?;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                command: command.join(" "),
                source,
            })?;

        let stdin = BufWriter::new(child.stdin.take().ok_or(EngineError::PipeClosed)?);
        let stdout = BufReader::new(child.stdout.take().ok_or(EngineError::PipeClosed)?);
        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    /// `uci` until `uciok`, then `isready` until `readyok`.
    fn handshake(&mut self) -> Result<(), EngineError> {
        self.send("uci")?;
        self.wait_for("uciok")?;
        self.send("isready")?;
        self.wait_for("readyok")?;
        debug!("engine ready");
        Ok(())
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(EngineError::PipeClosed);
        }
        Ok(line.trim().to_string())
    }

    fn wait_for(&mut self, token: &str) -> Result<(), EngineError> {
        loop {
            if self.read_line()? == token {
                return Ok(());
            }
        }
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        // The engine may already be gone.
        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_cp_is_taken_from_info_lines() {
        let line = "info depth 5 seldepth 7 score cp -31 nodes 12345 pv e7e5";
        assert_eq!(parse_score_cp(line), Some(-31));
    }

    #[test]
    fn info_lines_without_a_cp_score_are_skipped() {
        assert_eq!(parse_score_cp("info depth 5 nodes 12345"), None);
        assert_eq!(parse_score_cp("info depth 12 score mate 3 pv d8h4"), None);
        assert_eq!(parse_score_cp("bestmove e2e4"), None);
    }

    #[test]
    fn cp_token_outside_an_info_line_is_ignored() {
        assert_eq!(parse_score_cp("id name cp 100"), None);
    }

    #[test]
    fn bestmove_token_is_the_second_word() {
        assert_eq!(parse_bestmove("bestmove e2e4 ponder e7e5"), Some("e2e4"));
        assert_eq!(parse_bestmove("bestmove a7a8q"), Some("a7a8q"));
    }

    #[test]
    fn bestmove_none_means_no_move() {
        assert_eq!(parse_bestmove("bestmove (none)"), None);
        assert_eq!(parse_bestmove("bestmove"), None);
        assert_eq!(parse_bestmove("info string bestmove soon"), None);
    }
}
