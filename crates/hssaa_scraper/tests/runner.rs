use anyhow::Result;
use async_trait::async_trait;
use hssaa_scraper::fetch::UnavailableSource;
use hssaa_scraper::{find_league, Fetcher, LeagueRunner, LeagueSnapshot, PageSource, LEAGUES, MAX_ATTEMPTS};
use logger::EventLogger;
use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const BASE: &str = "http://hssaa.test";

const STANDINGS: &str = r#"
<html><body>
  <h3>Tier 1</h3>
  <table>
    <tr><th>School</th><th>GP</th><th>W</th><th>L</th></tr>
    <tr><td>School A</td><td>5</td><td>3</td><td>2</td></tr>
    <tr><td>School B</td><td>5</td><td>1</td><td>4</td></tr>
  </table>
</body></html>"#;

const SCORES: &str = r#"
<html><body><table>
  <tr><td>2024-01-05</td><td>School A</td><td>School B</td><td>3-1</td></tr>
</table></body></html>"#;

/// Serves canned pages by URL; anything else is a network error.
struct Scripted {
    pages: HashMap<String, &'static str>,
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl PageSource for Scripted {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .map(|html| html.to_string())
            .ok_or_else(|| anyhow::anyhow!("connection refused: {}", url))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn scripted_runner(pages: HashMap<String, &'static str>, out: &std::path::Path) -> (LeagueRunner, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let source = Scripted { pages, calls: calls.clone() };
    (LeagueRunner::new(Fetcher::new(Box::new(source)), BASE, out), calls)
}

fn read_snapshot(path: &std::path::Path) -> LeagueSnapshot {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn league_with_both_pages() {
    let dir = tempfile::tempdir().unwrap();
    let league = find_league("volleyball-filles-senior").unwrap();

    let mut pages = HashMap::new();
    pages.insert(league.standings_url(BASE), STANDINGS);
    pages.insert(league.scores_url(BASE), SCORES);
    let (runner, calls) = scripted_runner(pages, dir.path());

    let report = runner.scrape_league(league).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(report.path, dir.path().join("volleyball-filles-senior.json"));
    assert_eq!((report.standing_tables, report.score_rows), (1, 1));

    let snapshot = read_snapshot(&report.path);
    assert_eq!(snapshot.label, "Volleyball — Filles Senior");
    assert_eq!(snapshot.league_id, 4);
    assert_eq!(snapshot.school_id, 12);
    assert!(snapshot.updated.ends_with(" UTC"));
    assert_eq!(snapshot.standings[0].tier, "Tier 1");
    assert_eq!(snapshot.standings[0].rows.len(), 2);
    assert_eq!(snapshot.scores[0].0, vec!["2024-01-05", "School A", "School B", "3-1"]);
}

#[tokio::test]
async fn total_fetch_failure_still_writes_empty_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let journal_dir = dir.path().join("logs");
    let league = find_league("soccer-garcons-junior").unwrap();

    let (runner, calls) = scripted_runner(HashMap::new(), dir.path());
    let runner = runner.with_journal(EventLogger::new(&journal_dir));

    let report = runner.scrape_league(league).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2 * MAX_ATTEMPTS);
    assert!(!report.standings_fetched);
    assert!(!report.scores_fetched);

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report.path).unwrap()).unwrap();
    assert_eq!(raw["standings"], serde_json::json!([]));
    assert_eq!(raw["scores"], serde_json::json!([]));
    assert_eq!(raw["leagueid"], 29);

    let journal: String = fs::read_dir(&journal_dir)
        .unwrap()
        .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
        .collect();
    assert_eq!(journal.matches("\"FETCH_FAILED\"").count(), 2);
    assert_eq!(journal.matches("\"SNAPSHOT_WRITTEN\"").count(), 1);
}

#[tokio::test]
async fn one_page_failing_does_not_block_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let league = find_league("basketball-filles-junior").unwrap();

    let mut pages = HashMap::new();
    pages.insert(league.scores_url(BASE), SCORES);
    let (runner, _) = scripted_runner(pages, dir.path());

    let report = runner.scrape_league(league).await.unwrap();
    assert!(!report.standings_fetched);
    assert!(report.scores_fetched);

    let snapshot = read_snapshot(&report.path);
    assert!(snapshot.standings.is_empty());
    assert_eq!(snapshot.scores.len(), 1);
}

#[tokio::test]
async fn run_all_writes_every_league_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let (runner, _) = scripted_runner(HashMap::new(), dir.path());

    let summary = runner.run_all(LEAGUES).await;
    assert!(summary.is_success());
    let keys: Vec<_> = summary.written.iter().map(|r| r.key).collect();
    let expected: Vec<_> = LEAGUES.iter().map(|l| l.key).collect();
    assert_eq!(keys, expected);

    for league in LEAGUES {
        assert!(dir.path().join(format!("{}.json", league.key)).is_file());
    }
}

#[tokio::test]
async fn write_failure_is_reported_per_league() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"x").unwrap();

    let (runner, _) = scripted_runner(HashMap::new(), &blocker);
    let summary = runner.run_all(&LEAGUES[..2]).await;

    assert!(!summary.is_success());
    assert!(summary.written.is_empty());
    assert_eq!(summary.failed.len(), 2);
    assert_eq!(summary.failed[0].0, "basketball-filles-junior");
}

#[tokio::test]
async fn failing_league_does_not_stop_the_next_one() {
    let dir = tempfile::tempdir().unwrap();
    // A directory squatting on the first league's file name makes only that write fail.
    fs::create_dir(dir.path().join("basketball-filles-junior.json")).unwrap();

    let (runner, _) = scripted_runner(HashMap::new(), dir.path());
    let summary = runner.run_all(&LEAGUES[..2]).await;

    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "basketball-filles-junior");
    assert_eq!(summary.written.len(), 1);
    assert_eq!(summary.written[0].key, "basketball-filles-senior");

    let later = read_snapshot(&dir.path().join("basketball-filles-senior.json"));
    assert_eq!(later.league_id, 22);
    assert!(later.standings.is_empty());
}

#[tokio::test]
async fn unavailable_source_still_writes_every_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let source = UnavailableSource::new("Could not auto detect a chrome executable");
    let runner = LeagueRunner::new(Fetcher::new(Box::new(source)), BASE, dir.path());

    let summary = runner.run_all(LEAGUES).await;
    assert!(summary.is_success());
    assert_eq!(summary.written.len(), LEAGUES.len());
    assert!(summary.written.iter().all(|r| !r.standings_fetched && !r.scores_fetched));
}
