/// HSSAA Sync — Logger
/// JSONL run journal, one file per UTC day

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    #[cfg(test)]
    fn log_dir(&self) -> &std::path::Path {
        &self.log_dir
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open journal {}", path.display()))?;
        writeln!(f, "{line}")?;
        Ok(())
    }

    /// Journal writes never abort a run; failures only surface as a warning.
    pub fn record<T: Serialize>(&self, event: &T) {
        if let Err(e) = self.log(event) {
            tracing::warn!("Journal write failed: {:#}", e);
        }
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct RunStartedEvent {
    pub ts:           String,
    pub event:        &'static str,   // "RUN_STARTED"
    pub fetch_mode:   String,
    pub output_dir:   String,
    pub leagues:      usize,
}

#[derive(Serialize, Debug)]
pub struct FetchFailedEvent {
    pub ts:           String,
    pub event:        &'static str,   // "FETCH_FAILED"
    pub url:          String,
    pub attempts:     u32,
    pub last_error:   String,
}

#[derive(Serialize, Debug)]
pub struct SnapshotWrittenEvent {
    pub ts:              String,
    pub event:           &'static str,   // "SNAPSHOT_WRITTEN"
    pub key:             String,
    pub path:            String,
    pub standing_tables: usize,
    pub score_rows:      usize,
    pub standings_fetched: bool,
    pub scores_fetched:  bool,
}

#[derive(Serialize, Debug)]
pub struct LeagueFailedEvent {
    pub ts:           String,
    pub event:        &'static str,   // "LEAGUE_FAILED"
    pub key:          String,
    pub message:      String,
}

#[derive(Serialize, Debug)]
pub struct RunFinishedEvent {
    pub ts:           String,
    pub event:        &'static str,   // "RUN_FINISHED"
    pub written:      usize,
    pub failed:       usize,
    pub elapsed_ms:   u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let logger = EventLogger::new(dir.path().join("logs"));

        for key in ["a", "b"] {
            logger.log(&LeagueFailedEvent {
                ts: now_iso(),
                event: "LEAGUE_FAILED",
                key: key.to_string(),
                message: "disk full".to_string(),
            }).unwrap();
        }

        let date = Utc::now().format("%Y-%m-%d").to_string();
        let raw = fs::read_to_string(logger.log_dir().join(format!("{date}.jsonl"))).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "LEAGUE_FAILED");
        assert_eq!(first["key"], "a");
    }

    #[test]
    fn record_swallows_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the journal directory should be makes every open fail.
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, b"x").unwrap();
        let logger = EventLogger::new(&blocker);

        assert!(logger.log(&RunFinishedEvent {
            ts: now_iso(),
            event: "RUN_FINISHED",
            written: 0,
            failed: 0,
            elapsed_ms: 0,
        }).is_err());

        logger.record(&RunFinishedEvent {
            ts: now_iso(),
            event: "RUN_FINISHED",
            written: 0,
            failed: 0,
            elapsed_ms: 0,
        });
    }
}
