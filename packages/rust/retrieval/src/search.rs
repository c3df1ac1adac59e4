//! Search-provider client (SerpAPI-compatible).

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use briefcast_shared::{BriefcastError, Result};

/// Default search API origin.
const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// Results requested per query.
const RESULTS_PER_QUERY: &str = "5";

/// Timeout for search requests.
const SEARCH_TIMEOUT_SECS: u64 = 30;

/// Bound on the minimal probe request.
const PROBE_TIMEOUT_SECS: u64 = 12;

/// Fixed query issued by the reachability probe.
const PROBE_QUERY: &str = "site:reuters.com (test)";

/// User-Agent string for outbound requests.
const USER_AGENT: &str = concat!("briefcast/", env!("CARGO_PKG_VERSION"));

/// One raw hit returned by the search provider.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
}

/// Client for the web-search provider.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SearchClient {
    /// Create a client for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(3))
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| BriefcastError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Point the client at a different origin (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run one search query and return the provider's organic results.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("num", RESULTS_PER_QUERY),
                ("tbs", "qdr:d"),
            ])
            .send()
            .await
            .map_err(|e| BriefcastError::Network(format!("search request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefcastError::Network(format!("search: HTTP {status}")));
        }

        let body: SearchApiResponse = response
            .json()
            .await
            .map_err(|e| BriefcastError::Network(format!("search response decode: {e}")))?;

        let hits = body
            .organic_results
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawResult::into_hit)
            .collect();

        Ok(hits)
    }

    /// Minimal live request used by the status prober.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("engine", "google"),
                ("q", PROBE_QUERY),
                ("api_key", self.api_key.as_str()),
                ("num", "1"),
            ])
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| BriefcastError::Network(format!("search probe: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefcastError::Network(format!(
                "search probe: HTTP {status}"
            )));
        }

        let body: SearchApiResponse = response
            .json()
            .await
            .map_err(|e| BriefcastError::Network(format!("search probe decode: {e}")))?;

        // A well-formed success response carries metadata or results.
        if body.search_metadata.is_none() && body.organic_results.is_none() {
            return Err(BriefcastError::Network(
                "search probe: unexpected response shape".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchApiResponse {
    organic_results: Option<Vec<RawResult>>,
    search_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    title: Option<String>,
    link: Option<String>,
    url: Option<String>,
    snippet: Option<String>,
    #[serde(default)]
    snippet_highlighted_words: Option<Vec<String>>,
}

impl RawResult {
    /// Keep only results carrying both a title and a URL.
    fn into_hit(self) -> Option<SearchHit> {
        let title = self.title.filter(|t| !t.is_empty())?;
        let url = self.link.or(self.url).filter(|u| !u.is_empty())?;
        let snippet = self
            .snippet
            .filter(|s| !s.is_empty())
            .or_else(|| self.snippet_highlighted_words.map(|words| words.join(" ")))
            .filter(|s| !s.is_empty());

        Some(SearchHit {
            title,
            url,
            snippet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn raw_result_requires_title_and_url() {
        let raw = RawResult {
            title: Some("Grid update".into()),
            link: None,
            url: Some("https://example.com/grid".into()),
            snippet: None,
            snippet_highlighted_words: Some(vec!["load".into(), "growth".into()]),
        };
        let hit = raw.into_hit().expect("hit");
        assert_eq!(hit.url, "https://example.com/grid");
        assert_eq!(hit.snippet.as_deref(), Some("load growth"));

        let raw = RawResult {
            title: None,
            link: Some("https://example.com".into()),
            url: None,
            snippet: None,
            snippet_highlighted_words: None,
        };
        assert!(raw.into_hit().is_none());
    }

    #[tokio::test]
    async fn search_maps_organic_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("engine", "google"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search_metadata": {"status": "Success"},
                "organic_results": [
                    {"title": "First", "link": "https://example.com/a", "snippet": "alpha"},
                    {"title": "No URL here"},
                    {"title": "Second", "url": "https://example.com/b"}
                ]
            })))
            .mount(&server)
            .await;

        let client = SearchClient::new("test-key")
            .expect("client")
            .with_base_url(server.uri());

        let hits = client.search("grid reliability").await.expect("search");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "First");
        assert_eq!(hits[0].snippet.as_deref(), Some("alpha"));
        assert_eq!(hits[1].url, "https://example.com/b");
    }

    #[tokio::test]
    async fn search_http_error_is_a_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = SearchClient::new("bad-key")
            .expect("client")
            .with_base_url(server.uri());

        let err = client.search("anything").await.expect_err("error");
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn ping_accepts_metadata_only_responses() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("num", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search_metadata": {"status": "Success"}
            })))
            .mount(&server)
            .await;

        let client = SearchClient::new("test-key")
            .expect("client")
            .with_base_url(server.uri());
        client.ping().await.expect("ping");
    }

    #[tokio::test]
    async fn ping_rejects_unexpected_shapes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = SearchClient::new("test-key")
            .expect("client")
            .with_base_url(server.uri());
        assert!(client.ping().await.is_err());
    }
}
