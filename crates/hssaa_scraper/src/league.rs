//! Static league table for the HSSAA site.
//!
//! schoolid 12 = É.S. Gaétan-Gervais; scores pages are filtered to that school.

pub const BASE_URL: &str = "https://www.hssaa.ca";

const SCHOOL_ID: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueConfig {
    /// Also the stem of the output file name.
    pub key: &'static str,
    pub league_id: u32,
    pub label: &'static str,
    pub school_id: u32,
}

impl LeagueConfig {
    const fn new(key: &'static str, league_id: u32, label: &'static str) -> Self {
        Self { key, league_id, label, school_id: SCHOOL_ID }
    }

    pub fn standings_url(&self, base: &str) -> String {
        format!(
            "{}/displayStandings.php?leagueid={}",
            base.trim_end_matches('/'),
            self.league_id
        )
    }

    pub fn scores_url(&self, base: &str) -> String {
        format!(
            "{}/viewScores.php?leagueid={}&schoolid={}",
            base.trim_end_matches('/'),
            self.league_id,
            self.school_id
        )
    }
}

pub static LEAGUES: &[LeagueConfig] = &[
    LeagueConfig::new("basketball-filles-junior",  21, "Basketball — Filles Junior"),
    LeagueConfig::new("basketball-filles-senior",  22, "Basketball — Filles Senior"),
    LeagueConfig::new("basketball-garcons-junior", 1,  "Basketball — Garçons Junior"),
    LeagueConfig::new("basketball-garcons-senior", 2,  "Basketball — Garçons Senior"),
    LeagueConfig::new("volleyball-filles-junior",  3,  "Volleyball — Filles Junior"),
    LeagueConfig::new("volleyball-filles-senior",  4,  "Volleyball — Filles Senior"),
    LeagueConfig::new("volleyball-garcons-junior", 25, "Volleyball — Garçons Junior"),
    LeagueConfig::new("volleyball-garcons-senior", 26, "Volleyball — Garçons Senior"),
    LeagueConfig::new("soccer-filles-junior",      27, "Soccer — Filles Junior"),
    LeagueConfig::new("soccer-filles-senior",      28, "Soccer — Filles Senior"),
    LeagueConfig::new("soccer-garcons-junior",     29, "Soccer — Garçons Junior"),
    LeagueConfig::new("soccer-garcons-senior",     30, "Soccer — Garçons Senior"),
];

pub fn find_league(key: &str) -> Option<&'static LeagueConfig> {
    LEAGUES.iter().find(|l| l.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_twelve_unique_leagues() {
        assert_eq!(LEAGUES.len(), 12);
        let keys: HashSet<_> = LEAGUES.iter().map(|l| l.key).collect();
        let ids: HashSet<_> = LEAGUES.iter().map(|l| l.league_id).collect();
        assert_eq!(keys.len(), 12);
        assert_eq!(ids.len(), 12);
        assert!(LEAGUES.iter().all(|l| l.school_id == 12));
    }

    #[test]
    fn declaration_order_is_kept() {
        assert_eq!(LEAGUES[0].key, "basketball-filles-junior");
        assert_eq!(LEAGUES[11].key, "soccer-garcons-senior");
    }

    #[test]
    fn urls_follow_site_templates() {
        let league = find_league("soccer-filles-senior").unwrap();
        assert_eq!(
            league.standings_url(BASE_URL),
            "https://www.hssaa.ca/displayStandings.php?leagueid=28"
        );
        assert_eq!(
            league.scores_url("https://www.hssaa.ca/"),
            "https://www.hssaa.ca/viewScores.php?leagueid=28&schoolid=12"
        );
    }

    #[test]
    fn unknown_key_is_none() {
        assert!(find_league("curling-mixte").is_none());
    }
}
