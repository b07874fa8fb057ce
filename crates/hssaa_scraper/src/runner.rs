use anyhow::Result;
use chrono::Utc;
use logger::{now_iso, EventLogger, FetchFailedEvent, LeagueFailedEvent, SnapshotWrittenEvent};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::fetch::{FetchOutcome, Fetcher};
use crate::league::LeagueConfig;
use crate::parse::{parse_scores, parse_standings};
use crate::snapshot::{write_snapshot, LeagueSnapshot};

#[derive(Debug, Clone)]
pub struct LeagueReport {
    pub key: &'static str,
    pub path: PathBuf,
    pub standing_tables: usize,
    pub score_rows: usize,
    pub standings_fetched: bool,
    pub scores_fetched: bool,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<LeagueReport>,
    /// (league key, error chain)
    pub failed: Vec<(&'static str, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetches, parses and writes one league at a time.
pub struct LeagueRunner {
    fetcher: Fetcher,
    base_url: String,
    output_dir: PathBuf,
    journal: Option<EventLogger>,
}

impl LeagueRunner {
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            output_dir: output_dir.into(),
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: EventLogger) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn journal(&self) -> Option<&EventLogger> {
        self.journal.as_ref()
    }

    async fn fetch_page(&self, url: &str) -> Option<String> {
        match self.fetcher.fetch_outcome(url).await {
            FetchOutcome::Fetched(html) => Some(html),
            FetchOutcome::Exhausted { attempts, last_error } => {
                warn!("Giving up on {} after {} attempts", url, attempts);
                if let Some(journal) = &self.journal {
                    journal.record(&FetchFailedEvent {
                        ts: now_iso(),
                        event: "FETCH_FAILED",
                        url: url.to_string(),
                        attempts,
                        last_error,
                    });
                }
                None
            }
        }
    }

    /// A league whose pages could not be fetched still gets a snapshot,
    /// with empty standings and scores. Only the write can fail.
    pub async fn scrape_league(&self, league: &'static LeagueConfig) -> Result<LeagueReport> {
        info!("Scraping: {} (leagueid={})", league.label, league.league_id);

        let standings_html = self.fetch_page(&league.standings_url(&self.base_url)).await;
        let scores_html = self.fetch_page(&league.scores_url(&self.base_url)).await;

        let standings = parse_standings(standings_html.as_deref());
        let scores = parse_scores(scores_html.as_deref());

        let snapshot = LeagueSnapshot::new(league, Utc::now(), standings, scores);
        let path = write_snapshot(&self.output_dir, league.key, &snapshot)?;

        let report = LeagueReport {
            key: league.key,
            path,
            standing_tables: snapshot.standings.len(),
            score_rows: snapshot.scores.len(),
            standings_fetched: standings_html.is_some(),
            scores_fetched: scores_html.is_some(),
        };

        info!(
            "  ✓ Saved to {} ({} standing tables, {} score rows)",
            report.path.display(),
            report.standing_tables,
            report.score_rows
        );

        if let Some(journal) = &self.journal {
            journal.record(&SnapshotWrittenEvent {
                ts: now_iso(),
                event: "SNAPSHOT_WRITTEN",
                key: report.key.to_string(),
                path: report.path.display().to_string(),
                standing_tables: report.standing_tables,
                score_rows: report.score_rows,
                standings_fetched: report.standings_fetched,
                scores_fetched: report.scores_fetched,
            });
        }

        Ok(report)
    }

    /// Runs every league in order; one league failing never stops the rest.
    pub async fn run_all(&self, leagues: &'static [LeagueConfig]) -> RunSummary {
        let mut summary = RunSummary::default();

        for league in leagues {
            match self.scrape_league(league).await {
                Ok(report) => summary.written.push(report),
                Err(e) => {
                    error!("League {} failed: {:#}", league.key, e);
                    if let Some(journal) = &self.journal {
                        journal.record(&LeagueFailedEvent {
                            ts: now_iso(),
                            event: "LEAGUE_FAILED",
                            key: league.key.to_string(),
                            message: format!("{:#}", e),
                        });
                    }
                    summary.failed.push((league.key, format!("{:#}", e)));
                }
            }
        }

        summary
    }
}
