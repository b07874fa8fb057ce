use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::league::LeagueConfig;

pub const UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// One standings table, labelled by the tier heading above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierStandings {
    pub tier: String,
    pub rows: Vec<Vec<String>>,
}

/// One row of the scores page, cells in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreRow(pub Vec<String>);

/// Everything written for one league in one run. Field order is the
/// on-disk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub label: String,
    #[serde(rename = "leagueid")]
    pub league_id: u32,
    #[serde(rename = "schoolid")]
    pub school_id: u32,
    pub updated: String,
    pub standings: Vec<TierStandings>,
    pub scores: Vec<ScoreRow>,
}

impl LeagueSnapshot {
    pub fn new(
        league: &LeagueConfig,
        updated_at: DateTime<Utc>,
        standings: Vec<TierStandings>,
        scores: Vec<ScoreRow>,
    ) -> Self {
        Self {
            label: league.label.to_string(),
            league_id: league.league_id,
            school_id: league.school_id,
            updated: updated_at.format(UPDATED_FORMAT).to_string(),
            standings,
            scores,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self).context("snapshot serialisation failed")?;
        json.push('\n');
        Ok(json)
    }
}

pub fn snapshot_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

/// Writes `{dir}/{key}.json`, replacing whatever the previous run left.
pub fn write_snapshot(dir: &Path, key: &str, snapshot: &LeagueSnapshot) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;

    let path = snapshot_path(dir, key);
    let json = snapshot.to_json()?;
    fs::write(&path, json).with_context(|| format!("cannot write snapshot {}", path.display()))?;
    Ok(path)
}
