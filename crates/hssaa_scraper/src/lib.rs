//! HSSAA standings and scores scraper.
//!
//! Pages on hssaa.ca:
//!   /displayStandings.php?leagueid=<id>            → one table per tier
//!   /viewScores.php?leagueid=<id>&schoolid=<sid>   → games for one school
//!
//! Each league ends up as `<output_dir>/<key>.json`, rewritten every run.

pub mod config;
pub mod fetch;
pub mod league;
pub mod parse;
pub mod runner;
pub mod snapshot;

pub use config::ScrapeConfig;
pub use fetch::{build_source, FetchMode, FetchOutcome, Fetcher, PageSource, MAX_ATTEMPTS};
pub use league::{find_league, LeagueConfig, BASE_URL, LEAGUES};
pub use parse::{parse_scores, parse_standings};
pub use runner::{LeagueReport, LeagueRunner, RunSummary};
pub use snapshot::{write_snapshot, LeagueSnapshot, ScoreRow, TierStandings};
