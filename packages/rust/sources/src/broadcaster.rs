//! Broadcaster connector: anchor scan of an HTML headlines listing.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use briefcast_shared::{BriefcastError, FeedItem, Result};

use crate::FeedSource;

/// Default site origin.
const DEFAULT_BASE_URL: &str = "https://news.cctv.com";

/// Listing page scanned for headlines.
const LISTING_PATH: &str = "/china/";

/// Items kept after sorting.
const MAX_ITEMS: usize = 30;

/// Timeout for feed requests.
const FETCH_TIMEOUT_SECS: u64 = 15;

/// User-Agent string for outbound requests.
const USER_AGENT: &str = concat!("briefcast/", env!("CARGO_PKG_VERSION"));

/// Connector for the state broadcaster's headlines listing.
pub struct BroadcasterSource {
    client: Client,
    base_url: String,
}

impl BroadcasterSource {
    /// Create a connector for the default origin.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| BriefcastError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the connector at a different origin (tests, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl FeedSource for BroadcasterSource {
    fn id(&self) -> &'static str {
        "broadcaster"
    }

    fn label(&self) -> &'static str {
        "State broadcaster"
    }

    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        let listing_url = format!("{}{}", self.base_url, LISTING_PATH);

        let response = self
            .client
            .get(&listing_url)
            .send()
            .await
            .map_err(|e| BriefcastError::Network(format!("broadcaster listing: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefcastError::Network(format!(
                "broadcaster listing: HTTP {status}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| BriefcastError::Network(format!("broadcaster body read: {e}")))?;

        let mut items: HashMap<String, FeedItem> = HashMap::new();
        let doc = Html::parse_document(&html);
        let anchor = Selector::parse("a[href]").unwrap();

        for el in doc.select(&anchor) {
            let href = el.value().attr("href").unwrap_or_default();
            let text = el.text().collect::<String>();
            let title = match text.trim() {
                "" => el.value().attr("title").map(str::trim),
                text => Some(text),
            };

            if let Some(item) = build_item(&self.base_url, href, title) {
                items.entry(item.id.clone()).or_insert(item);
            }
        }

        let mut sorted: Vec<FeedItem> = items.into_values().collect();
        sorted.sort_by_key(|item| std::cmp::Reverse(item.published_at.unwrap_or(0)));

        if sorted.is_empty() {
            return Err(BriefcastError::validation(
                "broadcaster listing yielded no dated headlines",
            ));
        }

        sorted.truncate(MAX_ITEMS);
        Ok(sorted)
    }
}

/// Build one item from an anchor, rejecting undated or untitled links.
fn build_item(base_url: &str, href: &str, title: Option<&str>) -> Option<FeedItem> {
    let normalized = normalize_href(base_url, href)?;
    let cleaned = strip_query(&normalized);
    let published_at = parse_date_from_path(&cleaned)?;
    let title = title.filter(|t| !t.is_empty())?.to_string();

    Some(FeedItem {
        id: cleaned.clone(),
        title,
        mobile_url: Some(cleaned.clone()),
        url: cleaned,
        published_at: Some(published_at),
    })
}

/// Resolve protocol-relative and site-relative hrefs against the origin.
fn normalize_href(base_url: &str, href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if href.starts_with('/') {
        return Some(format!("{base_url}{href}"));
    }
    None
}

/// Drop query string and fragment from an article URL.
fn strip_query(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.to_string(),
    }
}

/// Extract a publish date from the `/YYYY/MM/DD/` segment of an article path.
///
/// Obviously stale archive years (still linked from page templates) are
/// rejected so the feed only carries current coverage.
fn parse_date_from_path(url: &str) -> Option<i64> {
    static DATE: OnceLock<Regex> = OnceLock::new();
    let pattern = DATE.get_or_init(|| Regex::new(r"/(20\d{2})/(\d{2})/(\d{2})/").unwrap());

    let captures = pattern.captures(url)?;
    let year: i32 = captures[1].parse().ok()?;
    let month: u32 = captures[2].parse().ok()?;
    let day: u32 = captures[3].parse().ok()?;

    let current_year = Utc::now().year();
    if year < current_year - 1 || year > current_year {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn href_normalization() {
        assert_eq!(
            normalize_href("https://example.com", "//cdn.example.com/x"),
            Some("https://cdn.example.com/x".into())
        );
        assert_eq!(
            normalize_href("https://example.com", "/2025/08/06/story.shtml"),
            Some("https://example.com/2025/08/06/story.shtml".into())
        );
        assert_eq!(normalize_href("https://example.com", "javascript:void(0)"), None);
        assert_eq!(normalize_href("https://example.com", ""), None);
    }

    #[test]
    fn stale_archive_years_are_rejected() {
        let year = Utc::now().year();
        assert!(parse_date_from_path(&format!("https://e.com/{year}/05/12/a.shtml")).is_some());
        assert!(parse_date_from_path(&format!("https://e.com/{}/05/12/a.shtml", year - 1)).is_some());
        assert!(parse_date_from_path("https://e.com/2019/05/12/a.shtml").is_none());
        assert!(parse_date_from_path("https://e.com/undated/a.shtml").is_none());
    }

    #[tokio::test]
    async fn fetch_collects_dated_headlines() {
        let server = MockServer::start().await;
        let year = Utc::now().year();

        let listing = format!(
            r##"<html><body>
                <a href="/{year}/08/05/older.shtml?spm=nav">Older headline</a>
                <a href="/{year}/08/06/newer.shtml">Newer headline</a>
                <a href="/{year}/08/06/newer.shtml">Newer headline (duplicate)</a>
                <a href="/2019/01/01/archive.shtml">Stale archive link</a>
                <a href="/about/">Undated chrome link</a>
            </body></html>"##
        );

        Mock::given(method("GET"))
            .and(path("/china/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing))
            .mount(&server)
            .await;

        let source = BroadcasterSource::new()
            .expect("source")
            .with_base_url(server.uri());

        let items = source.fetch().await.expect("fetch");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Newer headline");
        // Query strings are stripped from the dedup key and URL.
        assert!(items[1].url.ends_with("older.shtml"));
    }

    #[tokio::test]
    async fn fetch_fails_on_a_listing_with_no_dated_links() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/china/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<html><body><a href="/about/">About</a></body></html>"#),
            )
            .mount(&server)
            .await;

        let source = BroadcasterSource::new()
            .expect("source")
            .with_base_url(server.uri());

        let err = source.fetch().await.expect_err("error");
        assert!(matches!(err, BriefcastError::Validation { .. }));
    }
}
