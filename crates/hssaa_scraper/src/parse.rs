//! HTML table extraction for the standings and scores pages.
//!
//! Both pages are plain server-rendered tables. Standings come as one table
//! per tier, each preceded by a heading-ish sibling (`<h3>Tier 1</h3>`);
//! scores come as one loose table with no usable header.

use scraper::{ElementRef, Html, Selector};

use crate::snapshot::{ScoreRow, TierStandings};

/// Tier label used when no preceding sibling carries any text.
pub const DEFAULT_TIER: &str = "Classement";

/// A table needs a header plus at least one data row.
pub const MIN_TABLE_ROWS: usize = 2;

/// Spacer and separator rows have fewer cells than this.
pub const MIN_CELLS: usize = 3;

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Text of every descendant text node, each trimmed, joined with nothing.
pub fn cell_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect::<String>()
}

// ── Heuristics ───────────────────────────────────────────────────────────────

/// Skip a table only when its header mentions neither "School" nor "GP".
pub fn is_standings_header(headers: &[String]) -> bool {
    if headers.is_empty() {
        return false;
    }
    let joined = headers.join(" ");
    joined.contains("School") || joined.contains("GP")
}

pub fn has_min_cells(cells: &[String]) -> bool {
    cells.len() >= MIN_CELLS
}

pub fn has_data_rows<T>(rows: &[T]) -> bool {
    rows.len() >= MIN_TABLE_ROWS
}

/// Anti-bot interstitials parse fine but hold no tables.
pub fn looks_like_challenge_page(html: &str) -> bool {
    let lower = html.to_lowercase();
    lower.contains("just a moment")
        || lower.contains("cf-challenge")
        || lower.contains("captcha")
        || lower.contains("access denied")
}

// ── Standings ────────────────────────────────────────────────────────────────

/// Nearest preceding sibling element with non-empty text.
pub fn tier_label(table: ElementRef<'_>) -> Option<String> {
    table
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .map(cell_text)
        .find(|text| !text.is_empty())
}

pub fn parse_standings(html: Option<&str>) -> Vec<TierStandings> {
    let html = match html {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Vec::new(),
    };
    let (Some(table_sel), Some(tr_sel), Some(head_sel), Some(td_sel)) =
        (selector("table"), selector("tr"), selector("th, td"), selector("td"))
    else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut standings = Vec::new();

    for table in document.select(&table_sel) {
        let tier = tier_label(table).unwrap_or_else(|| DEFAULT_TIER.to_string());

        let rows: Vec<ElementRef<'_>> = table.select(&tr_sel).collect();
        if !has_data_rows(&rows) {
            continue;
        }

        let headers: Vec<String> = rows[0].select(&head_sel).map(cell_text).collect();
        if !is_standings_header(&headers) {
            continue;
        }

        let body: Vec<Vec<String>> = rows[1..]
            .iter()
            .map(|row| row.select(&td_sel).map(cell_text).collect::<Vec<_>>())
            .filter(|cells| has_min_cells(cells))
            .collect();

        if !body.is_empty() {
            standings.push(TierStandings { tier, rows: body });
        }
    }

    standings
}

// ── Scores ───────────────────────────────────────────────────────────────────

pub fn parse_scores(html: Option<&str>) -> Vec<ScoreRow> {
    let html = match html {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Vec::new(),
    };
    let (Some(tr_sel), Some(td_sel)) = (selector("tr"), selector("td")) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&tr_sel)
        .map(|row| row.select(&td_sel).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| has_min_cells(cells))
        .map(ScoreRow)
        .collect()
}
