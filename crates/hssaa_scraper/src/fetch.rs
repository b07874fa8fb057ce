//! Page retrieval.
//!
//! hssaa.ca answers plain HTTP clients with 403 Forbidden from time to time,
//! so retrieval is a pluggable `PageSource`: plain reqwest, a headless Chrome
//! shared for the whole run, or HTTP with a browser fallback on 403.
//! `Fetcher` puts the retry contract on top of any of them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use reqwest::StatusCode;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task;
use tracing::{debug, error, info, warn};

pub const MAX_ATTEMPTS: u32 = 3;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
const BROWSER_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// One attempt at getting the HTML behind a URL.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;

    fn name(&self) -> &'static str;
}

/// Non-2xx answer from the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpStatusError(pub StatusCode);

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HSSAA HTTP {}", self.0)
    }
}

impl std::error::Error for HttpStatusError {}

pub fn is_forbidden(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<HttpStatusError>(),
        Some(HttpStatusError(StatusCode::FORBIDDEN))
    )
}

// ── Plain HTTP ───────────────────────────────────────────────────────────────

pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("fr-CA,fr;q=0.9,en;q=0.8"),
        );

        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .default_headers(headers)
                .timeout(HTTP_TIMEOUT)
                .gzip(true)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url)
            .send()
            .await
            .with_context(|| format!("HSSAA request failed for {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HttpStatusError(status).into());
        }

        resp.text().await.context("failed to read response body")
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

// ── Headless Chrome ──────────────────────────────────────────────────────────

/// Owns one Chrome process for its whole lifetime; the process goes away
/// when the source is dropped.
pub struct BrowserSource {
    browser: Browser,
}

impl BrowserSource {
    pub async fn launch() -> Result<Self> {
        let browser = task::spawn_blocking(|| -> Result<Browser> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false)
                .idle_browser_timeout(BROWSER_IDLE_TIMEOUT)
                .build()
                .context("Failed to build Chrome launch options")?;

            Browser::new(options).context("Failed to launch Chrome")
        })
        .await
        .context("Chrome launch task panicked")??;

        info!("Headless Chrome launched");
        Ok(Self { browser })
    }
}

#[async_trait]
impl PageSource for BrowserSource {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let browser = self.browser.clone();
        let url = url.to_string();

        task::spawn_blocking(move || -> Result<String> {
            let tab = browser.new_tab().context("Failed to create browser tab")?;
            tab.set_default_timeout(NAVIGATION_TIMEOUT);

            let html = (|| -> Result<String> {
                tab.navigate_to(&url).context("Chrome navigate failed")?;
                tab.wait_until_navigated().context("Chrome navigation did not finish")?;
                tab.wait_for_element("body").context("Chrome wait_for_element(body) failed")?;
                tab.get_content().context("Failed to read HTML from browser tab")
            })();

            if let Err(e) = tab.close(true) {
                debug!("Closing tab for {} failed: {}", url, e);
            }
            html
        })
        .await
        .context("Chrome fetch task panicked")?
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

// ── HTTP with browser fallback ───────────────────────────────────────────────

pub type SourceFuture = Pin<Box<dyn Future<Output = Result<Box<dyn PageSource>>> + Send>>;
type SourceLauncher = Box<dyn Fn() -> SourceFuture + Send + Sync>;

/// Primary source first; only a 403 sends the same URL to the secondary.
/// The secondary is built the first time it is needed and reused after that.
/// A failed build is kept too, so a run pays for at most one.
pub struct FallbackSource {
    primary: Box<dyn PageSource>,
    launch: SourceLauncher,
    secondary: OnceCell<std::result::Result<Box<dyn PageSource>, String>>,
}

impl FallbackSource {
    pub fn new(
        primary: Box<dyn PageSource>,
        launch: impl Fn() -> SourceFuture + Send + Sync + 'static,
    ) -> Self {
        Self { primary, launch: Box::new(launch), secondary: OnceCell::new() }
    }

    /// reqwest, escalating to headless Chrome on 403.
    pub fn http_then_browser() -> Self {
        Self::new(Box::new(HttpSource::new()), || -> SourceFuture {
            Box::pin(async {
                let browser: Box<dyn PageSource> = Box::new(BrowserSource::launch().await?);
                Ok(browser)
            })
        })
    }

    async fn secondary(&self) -> Result<&dyn PageSource> {
        let built = self
            .secondary
            .get_or_init(|| async {
                (self.launch)().await.map_err(|e| {
                    warn!("Browser fallback unavailable: {:#}", e);
                    format!("{:#}", e)
                })
            })
            .await;

        match built {
            Ok(source) => Ok(&**source),
            Err(reason) => Err(anyhow::anyhow!("browser fallback unavailable: {}", reason)),
        }
    }
}

#[async_trait]
impl PageSource for FallbackSource {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        match self.primary.fetch_page(url).await {
            Ok(html) => Ok(html),
            Err(err) if is_forbidden(&err) => {
                warn!("HSSAA HTTP 403 on {}, trying browser fallback", url);
                self.secondary().await?.fetch_page(url).await
            }
            Err(err) => Err(err),
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Stands in when the configured source cannot be set up; every fetch fails
/// with the setup error, so leagues still get (empty) snapshots.
pub struct UnavailableSource {
    reason: String,
}

impl UnavailableSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl PageSource for UnavailableSource {
    async fn fetch_page(&self, _url: &str) -> Result<String> {
        Err(anyhow::anyhow!("page source unavailable: {}", self.reason))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

// ── Mode selection ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    Http,
    Browser,
    #[default]
    Fallback,
}

impl FromStr for FetchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(FetchMode::Http),
            "browser" => Ok(FetchMode::Browser),
            "fallback" => Ok(FetchMode::Fallback),
            other => Err(anyhow::anyhow!("unknown fetch mode '{}' (expected http, browser or fallback)", other)),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchMode::Http => "http",
            FetchMode::Browser => "browser",
            FetchMode::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// A Chrome that will not start is logged, not fatal: the run goes on with a
/// source that always fails.
pub async fn build_source(mode: FetchMode) -> Box<dyn PageSource> {
    match mode {
        FetchMode::Http => Box::new(HttpSource::new()),
        FetchMode::Browser => match BrowserSource::launch().await {
            Ok(browser) => Box::new(browser),
            Err(e) => {
                error!("Browser mode requested but Chrome is unavailable: {:#}", e);
                Box::new(UnavailableSource::new(format!("{:#}", e)))
            }
        },
        FetchMode::Fallback => Box::new(FallbackSource::http_then_browser()),
    }
}

// ── Retry ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(String),
    Exhausted { attempts: u32, last_error: String },
}

impl FetchOutcome {
    pub fn into_page(self) -> Option<String> {
        match self {
            FetchOutcome::Fetched(html) => Some(html),
            FetchOutcome::Exhausted { .. } => None,
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }
}

pub struct Fetcher {
    source: Box<dyn PageSource>,
    max_attempts: u32,
}

impl Fetcher {
    pub fn new(source: Box<dyn PageSource>) -> Self {
        Self { source, max_attempts: MAX_ATTEMPTS }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Tries the URL up to `MAX_ATTEMPTS` times back to back. Never fails;
    /// exhaustion is reported as an outcome.
    pub async fn fetch_outcome(&self, url: &str) -> FetchOutcome {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match self.source.fetch_page(url).await {
                Ok(html) => {
                    debug!("Fetched {} ({} bytes, attempt {})", url, html.len(), attempt);
                    return FetchOutcome::Fetched(html);
                }
                Err(e) => {
                    warn!("Attempt {} failed for {}: {:#}", attempt, url, e);
                    last_error = format!("{:#}", e);
                }
            }
        }

        FetchOutcome::Exhausted { attempts: self.max_attempts, last_error }
    }

    pub async fn fetch(&self, url: &str) -> Option<String> {
        self.fetch_outcome(url).await.into_page()
    }
}
