/// Score ledger: every finished run's score, persisted across launches.
///
/// ## File format:
///   Plain text, one non-negative integer per line, append-only.
///   Reading stops at the first token that is not an integer, or after
///   `MAX_ENTRIES` values.
///
/// A ledger file that does not exist yet is an empty ledger (first launch);
/// any other read failure is reported.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::rules::{top_five, LEADERBOARD_SLOTS};
use crate::error::{GameError, Result};

pub const MAX_ENTRIES: usize = 1000;

pub trait ScoreLedger {
    /// Recorded scores, oldest first.
    fn scores(&self) -> Result<Vec<u32>>;
    /// Append one final score.
    fn record(&mut self, score: u32) -> Result<()>;

    fn leaderboard(&self) -> Result<[u32; LEADERBOARD_SLOTS]> {
        Ok(top_five(&self.scores()?))
    }
}

// ── File-backed ledger ──

pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileLedger { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreLedger for FileLedger {
    fn scores(&self) -> Result<Vec<u32>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(GameError::SourceUnavailable { path: self.path.clone(), source })
            }
        };
        Ok(parse_scores(&text))
    }

    fn record(&mut self, score: u32) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(GameError::Ledger)?;
        writeln!(file, "{score}").map_err(GameError::Ledger)?;
        tracing::info!(score, path = %self.path.display(), "score recorded");
        Ok(())
    }
}

fn parse_scores(text: &str) -> Vec<u32> {
    text.split_whitespace()
        .map_while(|tok| tok.parse::<u32>().ok())
        .take(MAX_ENTRIES)
        .collect()
}

// ── In-memory ledger ──

/// Ledger that lives only as long as the process.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryLedger {
    pub entries: Vec<u32>,
}

#[cfg(test)]
impl ScoreLedger for MemoryLedger {
    fn scores(&self) -> Result<Vec<u32>> {
        Ok(self.entries.iter().copied().take(MAX_ENTRIES).collect())
    }

    fn record(&mut self, score: u32) -> Result<()> {
        self.entries.push(score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_ledger(tag: &str) -> FileLedger {
        let path = std::env::temp_dir()
            .join(format!("co2quiz-ledger-{tag}-{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);
        FileLedger::new(path)
    }

    #[test]
    fn missing_file_is_empty_ledger() {
        let ledger = temp_ledger("missing");
        assert!(ledger.scores().unwrap().is_empty());
        assert_eq!(ledger.leaderboard().unwrap(), [0; 5]);
    }

    #[test]
    fn record_appends_lines() {
        let mut ledger = temp_ledger("append");
        for s in [3, 7, 7, 2, 9, 1] {
            ledger.record(s).unwrap();
        }
        let text = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(text, "3\n7\n7\n2\n9\n1\n");
        assert_eq!(ledger.leaderboard().unwrap(), [9, 7, 7, 3, 2]);
        std::fs::remove_file(ledger.path()).unwrap();
    }

    #[test]
    fn parse_stops_at_garbage() {
        assert_eq!(parse_scores("4\n5\nx\n6\n"), vec![4, 5]);
        assert_eq!(parse_scores("  1 2\n\n3"), vec![1, 2, 3]);
    }

    #[test]
    fn parse_reads_at_most_max_entries() {
        let text: String = (0..1500).map(|i| format!("{i}\n")).collect();
        let scores = parse_scores(&text);
        assert_eq!(scores.len(), MAX_ENTRIES);
        assert_eq!(scores[MAX_ENTRIES - 1], 999);
    }

    #[test]
    fn directory_path_is_source_unavailable() {
        let ledger = FileLedger::new(std::env::temp_dir());
        assert!(matches!(ledger.scores(), Err(GameError::SourceUnavailable { .. })));
    }

    #[test]
    fn memory_ledger_leaderboard() {
        let mut ledger = MemoryLedger::default();
        ledger.record(4).unwrap();
        ledger.record(4).unwrap();
        assert_eq!(ledger.leaderboard().unwrap(), [4, 4, 0, 0, 0]);
    }
}
