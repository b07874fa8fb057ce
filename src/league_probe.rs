//! Probe one league without writing anything.
//! Run: cargo run --bin league-probe -- soccer-filles-senior

use anyhow::{bail, Result};
use dotenv::dotenv;
use hssaa_scraper::parse::looks_like_challenge_page;
use hssaa_scraper::{build_source, find_league, parse_scores, parse_standings, Fetcher, ScrapeConfig, LEAGUES};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let key = env::args().nth(1).unwrap_or_else(|| LEAGUES[0].key.to_string());
    let Some(league) = find_league(&key) else {
        let known: Vec<&str> = LEAGUES.iter().map(|l| l.key).collect();
        bail!("unknown league '{}'; known keys: {}", key, known.join(", "));
    };

    let cfg = ScrapeConfig::from_env();
    info!("Probing {} ({}) via {}", league.key, league.label, cfg.fetch_mode);

    let fetcher = Fetcher::new(build_source(cfg.fetch_mode).await);

    let standings_url = league.standings_url(&cfg.base_url);
    match fetcher.fetch(&standings_url).await {
        Some(html) => {
            let tiers = parse_standings(Some(&html));
            info!(
                "Standings {} -> html_len={}, tables={}, challenge_page={}",
                standings_url,
                html.len(),
                tiers.len(),
                looks_like_challenge_page(&html)
            );
            for tier in &tiers {
                info!("  {}: {} rows", tier.tier, tier.rows.len());
            }
        }
        None => warn!("Standings {} unreachable", standings_url),
    }

    let scores_url = league.scores_url(&cfg.base_url);
    match fetcher.fetch(&scores_url).await {
        Some(html) => {
            let rows = parse_scores(Some(&html));
            info!(
                "Scores {} -> html_len={}, rows={}, challenge_page={}",
                scores_url,
                html.len(),
                rows.len(),
                looks_like_challenge_page(&html)
            );
            if let Some(first) = rows.first() {
                info!("  first row: {}", first.0.join(" | "));
            }
        }
        None => warn!("Scores {} unreachable", scores_url),
    }

    Ok(())
}
