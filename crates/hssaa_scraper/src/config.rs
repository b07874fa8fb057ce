use std::env;
use std::path::PathBuf;
use tracing::warn;

use crate::fetch::FetchMode;
use crate::league::BASE_URL;

pub const DEFAULT_OUTPUT_DIR: &str = "assets/data/sports";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Run settings. Every field has a fixed default; the environment (or a
/// `.env` file loaded beforehand) may override them. The league table is not
/// configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub fetch_mode: FetchMode,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            fetch_mode: FetchMode::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(base) = var("HSSAA_BASE_URL") {
            cfg.base_url = base;
        }
        if let Some(dir) = var("HSSAA_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("HSSAA_LOG_DIR") {
            cfg.log_dir = PathBuf::from(dir);
        }
        if let Some(mode) = var("HSSAA_FETCH_MODE") {
            match mode.parse() {
                Ok(m) => cfg.fetch_mode = m,
                Err(e) => warn!("{}, using {}", e, cfg.fetch_mode),
            }
        }

        cfg
    }
}
