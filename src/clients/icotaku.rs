//! Network collaborator fetching planning pages from the source site.
//!
//! Layout scraping is deliberately thin: one regex pass extracts sheet
//! links, titles and visibility markers from a planning page. Everything
//! downstream works on [`ScrapedItem`] values, and the [`SheetSource`]
//! trait lets tests substitute a canned source.

use crate::models::{CategoryKind, SeasonKind, Section};
use crate::resolver;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

/// One item listed on a planning page, already reduced to facts.
#[derive(Debug, Clone)]
pub struct ScrapedItem {
    /// Canonical sheet URL, absolute.
    pub url: String,
    pub title: String,
    pub episode_number: Option<i32>,
    pub is_adult: bool,
    pub is_explicit: bool,
    /// Category names referenced by the item, with their flavor.
    pub categories: Vec<(String, CategoryKind)>,
    /// Distribution format name, when the page carries one.
    pub format: Option<String>,
}

/// Source of planning page content. The engine only ever talks to this
/// seam, never to the network directly.
#[async_trait::async_trait]
pub trait SheetSource: Send + Sync {
    async fn seasonal_items(&self, year: i32, kind: SeasonKind) -> Result<Vec<ScrapedItem>>;

    async fn daily_items(&self, date: NaiveDate) -> Result<Vec<ScrapedItem>>;
}

struct PlanningRegex {
    anchor: Regex,
    episode: Regex,
}

impl PlanningRegex {
    fn get() -> Option<&'static Self> {
        static INSTANCE: OnceLock<Option<PlanningRegex>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                Some(Self {
                    anchor: Regex::new(
                        r#"(?s)<a[^>]+href="(?P<href>[^"]+)"[^>]*class="(?P<class>[^"]*)"[^>]*>(?P<title>[^<]+)</a>"#,
                    )
                    .ok()?,
                    episode: Regex::new(r"[Ee]pisode\s+(\d+)").ok()?,
                })
            })
            .as_ref()
    }
}

#[derive(Clone)]
pub struct IcotakuClient {
    client: Client,
    request_delay: Duration,
}

impl IcotakuClient {
    pub fn new(user_agent: &str, request_delay_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .user_agent(user_agent.to_string())
                .build()
                .unwrap_or_else(|_| Client::new()),
            request_delay: Duration::from_millis(request_delay_ms),
        }
    }

    async fn fetch_planning_page(&self, path: &str) -> Result<String> {
        let url = resolver::build_url(Section::Anime, path)
            .ok_or_else(|| anyhow!("cannot build planning URL for '{path}'"))?;

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?;

        if !response.status().is_success() {
            return Err(anyhow!("{url} returned {}", response.status()));
        }

        response.text().await.context("reading planning page body")
    }

    /// Extracts planning items from page HTML. Only anchors that resolve
    /// to a sheet identity are kept; navigation links fall out naturally.
    fn extract_items(html: &str) -> Result<Vec<ScrapedItem>> {
        let regex = PlanningRegex::get().ok_or_else(|| anyhow!("planning regexes failed"))?;

        let mut items = Vec::new();
        for capture in regex.anchor.captures_iter(html) {
            let href = capture.name("href").map_or("", |m| m.as_str());
            let class = capture.name("class").map_or("", |m| m.as_str());
            let title = capture
                .name("title")
                .map_or("", |m| m.as_str())
                .trim()
                .to_string();

            if title.is_empty() || resolver::resolve(href).is_err() {
                continue;
            }

            let episode_number = regex
                .episode
                .captures(&title)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok());

            items.push(ScrapedItem {
                url: href.to_string(),
                title,
                episode_number,
                is_adult: class.contains("planning_adulte"),
                is_explicit: class.contains("planning_hentai"),
                categories: Vec::new(),
                format: None,
            });
        }
        Ok(items)
    }
}

#[async_trait::async_trait]
impl SheetSource for IcotakuClient {
    async fn seasonal_items(&self, year: i32, kind: SeasonKind) -> Result<Vec<ScrapedItem>> {
        let path = format!("/planning/saison/{}_{year}", kind.site_label());
        let html = self.fetch_planning_page(&path).await?;
        Self::extract_items(&html)
    }

    async fn daily_items(&self, date: NaiveDate) -> Result<Vec<ScrapedItem>> {
        let path = format!("/planning/date/{}", date.format("%Y-%m-%d"));
        let html = self.fetch_planning_page(&path).await?;
        Self::extract_items(&html)
    }
}
