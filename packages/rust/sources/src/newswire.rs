//! Newswire connector: paged keyword search against a JSON news API.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use briefcast_shared::{BriefcastError, FeedItem, Result};

use crate::FeedSource;

/// Default search API origin.
const DEFAULT_BASE_URL: &str = "https://so.news.cn";

/// Default keyword tracked by the briefing watchlist.
const DEFAULT_KEYWORD: &str = "energy";

/// Result pages fetched per refresh.
const PAGE_COUNT: u32 = 2;

/// Items kept after sorting.
const MAX_ITEMS: usize = 20;

/// Timeout for feed requests.
const FETCH_TIMEOUT_SECS: u64 = 15;

/// User-Agent string for outbound requests.
const USER_AGENT: &str = concat!("briefcast/", env!("CARGO_PKG_VERSION"));

/// Connector for the national newswire search API.
pub struct NewswireSource {
    client: Client,
    base_url: String,
    keyword: String,
}

impl NewswireSource {
    /// Create a connector for the default endpoint and keyword.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| BriefcastError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            keyword: DEFAULT_KEYWORD.to_string(),
        })
    }

    /// Point the connector at a different origin (tests, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Track a different keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }
}

#[async_trait]
impl FeedSource for NewswireSource {
    fn id(&self) -> &'static str {
        "newswire"
    }

    fn label(&self) -> &'static str {
        "National newswire"
    }

    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        let mut items: HashMap<String, FeedItem> = HashMap::new();

        for page in 1..=PAGE_COUNT {
            let response = self
                .client
                .get(format!("{}/getNews", self.base_url))
                .query(&[
                    ("curPage", page.to_string().as_str()),
                    ("searchFields", "0"),
                    ("sortField", "0"),
                    ("keyword", self.keyword.as_str()),
                ])
                .send()
                .await
                .map_err(|e| BriefcastError::Network(format!("newswire page {page}: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(BriefcastError::Network(format!(
                    "newswire page {page}: HTTP {status}"
                )));
            }

            let body: RawResponse = response.json().await.map_err(|e| {
                BriefcastError::Network(format!("newswire page {page} decode: {e}"))
            })?;

            for entry in body.content.and_then(|c| c.results).unwrap_or_default() {
                if let Some(item) = entry.into_item() {
                    items.entry(item.id.clone()).or_insert(item);
                }
            }
        }

        let mut sorted: Vec<FeedItem> = items.into_values().collect();
        sorted.sort_by_key(|item| std::cmp::Reverse(item.published_at.unwrap_or(0)));

        if sorted.is_empty() {
            return Err(BriefcastError::validation("newswire returned no valid items"));
        }

        sorted.truncate(MAX_ITEMS);
        Ok(sorted)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawResponse {
    content: Option<RawContent>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    results: Option<Vec<RawResult>>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(rename = "contentId")]
    content_id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    pubtime: Option<String>,
}

impl RawResult {
    /// Keep only entries carrying a link and a non-empty title.
    fn into_item(self) -> Option<FeedItem> {
        let url = self.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
        let title = strip_html(self.title.as_deref()?)?;

        Some(FeedItem {
            id: self.content_id.unwrap_or_else(|| url.clone()),
            title,
            mobile_url: Some(url.clone()),
            url,
            published_at: self.pubtime.as_deref().and_then(parse_publish_time),
        })
    }
}

/// Drop markup from a title, returning `None` when nothing readable remains.
fn strip_html(text: &str) -> Option<String> {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").unwrap());
    let cleaned = tags.replace_all(text, "").trim().to_string();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Parse the API's slash-separated timestamps into epoch milliseconds.
fn parse_publish_time(value: &str) -> Option<i64> {
    let normalized = value.trim().replace('/', "-");
    if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
