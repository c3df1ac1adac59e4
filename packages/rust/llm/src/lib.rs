//! Chat-completions client for the generation backend.
//!
//! Speaks the OpenAI-compatible `/v1/chat/completions` shape. Extraction of
//! the completion text tries the documented field path first
//! (`choices[0].message.content`) and the provider's envelope variant
//! (`data.content`) second; an empty completion is a fatal generation error
//! that the caller never retries or defaults.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use briefcast_shared::{BriefcastError, Result};

/// Bound on one generation request.
const GENERATION_TIMEOUT_SECS: u64 = 30;

/// Bound on the minimal probe request.
const PROBE_TIMEOUT_SECS: u64 = 12;

/// Token cap for the probe completion.
const PROBE_MAX_TOKENS: u32 = 20;

/// User-Agent string for outbound requests.
const USER_AGENT: &str = concat!("briefcast/", env!("CARGO_PKG_VERSION"));

/// One chat message in a generation request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Client for the generation backend.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    model: String,
}

impl ChatClient {
    /// Create a client for a backend at `base_url` using `model`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| BriefcastError::config("generation API key contains invalid characters"))?;
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()
            .map_err(|e| BriefcastError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Run one completion and return the trimmed text.
    pub async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        let response = self
            .client
            .post(self.completions_url())
            .json(&ChatApiRequest {
                model: &self.model,
                messages,
                temperature,
                max_tokens: None,
            })
            .send()
            .await
            .map_err(|e| BriefcastError::Network(format!("generation request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefcastError::Network(format!(
                "generation backend: HTTP {status}"
            )));
        }

        let body: ChatApiResponse = response
            .json()
            .await
            .map_err(|e| BriefcastError::Network(format!("generation response decode: {e}")))?;

        let text = extract_completion(body)
            .ok_or_else(|| BriefcastError::Generation("model returned an empty completion".into()))?;

        Ok(text)
    }

    /// Minimal live request used by the status prober.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .post(self.completions_url())
            .json(&ChatApiRequest {
                model: &self.model,
                messages: &[ChatMessage::user("ping")],
                temperature: 0.0,
                max_tokens: Some(PROBE_MAX_TOKENS),
            })
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| BriefcastError::Network(format!("generation probe: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefcastError::Network(format!(
                "generation probe: HTTP {status}"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatApiResponse {
    choices: Option<Vec<Choice>>,
    data: Option<DataEnvelope>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope {
    content: Option<String>,
}

/// Pull the primary completion text, trying both documented paths.
fn extract_completion(body: ChatApiResponse) -> Option<String> {
    let primary = body
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content);

    let text = primary
        .or_else(|| body.data.and_then(|data| data.content))?
        .trim()
        .to_string();

    if text.is_empty() { None } else { Some(text) }
}
