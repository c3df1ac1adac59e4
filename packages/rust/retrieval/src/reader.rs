//! Content-reader client: extracts readable body text for a URL.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use briefcast_shared::{BriefcastError, Result};

/// Default reader API origin.
const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

/// Timeout for extraction requests.
const EXTRACT_TIMEOUT_SECS: u64 = 20;

/// Bound on the minimal probe request.
const PROBE_TIMEOUT_SECS: u64 = 12;

/// Fixed target used by the reachability probe.
const PROBE_URL: &str = "https://example.com";

/// User-Agent string for outbound requests.
const USER_AGENT: &str = concat!("briefcast/", env!("CARGO_PKG_VERSION"));

/// Client for the content-extraction provider.
#[derive(Clone)]
pub struct ReaderClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ReaderClient {
    /// Create a client for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(EXTRACT_TIMEOUT_SECS))
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

    /// Extract the readable body of `url` as markdown.
    ///
    /// The provider answers with either a bare string or an envelope whose
    /// payload sits under `data`, `content`, or `markdown`; all shapes are
    /// accepted.
    pub async fn extract(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/reader", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "url": url,
                "timeout": 20,
                "no_cache": false,
                "return_format": "markdown",
            }))
            .send()
            .await
            .map_err(|e| BriefcastError::Network(format!("reader request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefcastError::Network(format!("reader: HTTP {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BriefcastError::Network(format!("reader response decode: {e}")))?;

        Ok(extract_payload(body))
    }

    /// Minimal live request used by the status prober.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/reader", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "url": PROBE_URL,
                "timeout": 10,
                "no_cache": true,
                "return_format": "markdown",
            }))
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| BriefcastError::Network(format!("reader probe: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefcastError::Network(format!(
                "reader probe: HTTP {status}"
            )));
        }

        Ok(())
    }
}

/// Pull the markdown payload out of whatever envelope the provider used.
fn extract_payload(body: Value) -> String {
    match body {
        Value::String(text) => text,
        Value::Object(map) => {
            for key in ["data", "content", "markdown"] {
                if let Some(Value::String(text)) = map.get(key) {
                    return text.clone();
                }
            }
            Value::Object(map).to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn payload_extraction_handles_all_envelope_shapes() {
        assert_eq!(
            extract_payload(Value::String("# Heading".into())),
            "# Heading"
        );
        assert_eq!(
            extract_payload(serde_json::json!({"data": "body text"})),
            "body text"
        );
        assert_eq!(
            extract_payload(serde_json::json!({"content": "from content"})),
            "from content"
        );
        assert_eq!(
            extract_payload(serde_json::json!({"markdown": "from markdown"})),
            "from markdown"
        );
        // Unknown envelopes degrade to their JSON text rather than failing.
        let fallback = extract_payload(serde_json::json!({"unexpected": 1}));
        assert!(fallback.contains("unexpected"));
    }

    #[tokio::test]
    async fn extract_returns_markdown_from_data_field() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/reader"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": "# Article\n\nBody paragraph."
            })))
            .mount(&server)
            .await;

        let client = ReaderClient::new("reader-key")
            .expect("client")
            .with_base_url(server.uri());

        let body = client
            .extract("https://example.com/article")
            .await
            .expect("extract");
        assert!(body.starts_with("# Article"));
    }

    #[tokio::test]
    async fn extract_http_error_is_a_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/reader"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ReaderClient::new("reader-key")
            .expect("client")
            .with_base_url(server.uri());

        assert!(client.extract("https://example.com/x").await.is_err());
    }

    #[tokio::test]
    async fn ping_succeeds_on_any_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/reader"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": "# Example Domain"
            })))
            .mount(&server)
            .await;

        let client = ReaderClient::new("reader-key")
            .expect("client")
            .with_base_url(server.uri());
        client.ping().await.expect("ping");
    }
}
