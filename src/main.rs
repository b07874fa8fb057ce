/// HSSAA Sync — nightly standings & scores scrape
///
/// What it does:
///   1. For every league in the static table, fetch the standings and scores pages
///   2. Pull the tables out into rows
///   3. Write `<HSSAA_OUTPUT_DIR>/<key>.json` (default assets/data/sports)
///
/// Run:
///   cargo run --bin hssaa-scrape

use anyhow::{bail, Context, Result};
use chrono::Utc;
use dotenv::dotenv;
use hssaa_scraper::{build_source, Fetcher, LeagueRunner, ScrapeConfig, LEAGUES};
use logger::{now_iso, EventLogger, RunFinishedEvent, RunStartedEvent};
use std::env;
use std::fs::{self, File};
use std::time::Instant;
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

    let started = Instant::now();
    info!("HSSAA scraper starting — {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));

    // Single instance lock
    let lock_file_path = env::temp_dir().join("hssaa_scrape.lock");
    let lock_file = File::create(&lock_file_path)
        .with_context(|| format!("Failed to create lock file at {:?}", lock_file_path))?;

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => guard,
        Err(_) => {
            warn!("Another hssaa-scrape run is already in progress! Exiting.");
            return Ok(());
        }
    };

    let cfg = ScrapeConfig::from_env();
    info!("Output: {}", cfg.output_dir.display());
    info!("Fetch mode: {}", cfg.fetch_mode);

    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("cannot create output directory {}", cfg.output_dir.display()))?;

    let journal = EventLogger::new(&cfg.log_dir);
    journal.record(&RunStartedEvent {
        ts: now_iso(),
        event: "RUN_STARTED",
        fetch_mode: cfg.fetch_mode.to_string(),
        output_dir: cfg.output_dir.display().to_string(),
        leagues: LEAGUES.len(),
    });

    // Chrome, when used, lives exactly as long as the runner
    let source = build_source(cfg.fetch_mode).await;
    let runner = LeagueRunner::new(Fetcher::new(source), cfg.base_url.clone(), cfg.output_dir.clone())
        .with_journal(journal);

    let summary = runner.run_all(LEAGUES).await;

    if let Some(journal) = runner.journal() {
        journal.record(&RunFinishedEvent {
            ts: now_iso(),
            event: "RUN_FINISHED",
            written: summary.written.len(),
            failed: summary.failed.len(),
            elapsed_ms: started.elapsed().as_millis(),
        });
    }
    drop(runner);

    let empty = summary
        .written
        .iter()
        .filter(|r| !r.standings_fetched && !r.scores_fetched)
        .count();
    if empty > 0 {
        warn!("{} league(s) written with no data (both pages unreachable)", empty);
    }

    if !summary.is_success() {
        for (key, err) in &summary.failed {
            warn!("  ✗ {}: {}", key, err);
        }
        bail!("{} of {} leagues could not be written", summary.failed.len(), LEAGUES.len());
    }

    info!("All done. {} snapshots in {:.1}s", summary.written.len(), started.elapsed().as_secs_f64());
    Ok(())
}
