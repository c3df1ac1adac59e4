//! End-to-end briefing pipeline:
//! validate → normalize → gather (parallel) → generate (serial) → assemble.

use tracing::{info, instrument};

use briefcast_llm::ChatClient;
use briefcast_retrieval::{ReaderClient, RetrievalClients, SearchClient, gather_context};
use briefcast_shared::{
    BriefcastError, BriefingRequest, BriefingResponse, Reference, Result, RuntimeConfig,
    SearchMode, SectionContext, SectionResult, section_templates,
};

use crate::normalize::normalize_sections;
use crate::prompt::{GENERATION_TEMPERATURE, build_prompt};

/// Generate a full briefing for `request` using the resolved configuration.
///
/// Credentials are validated up front: the generation key is always
/// required, and web mode additionally requires the search and reader keys.
/// A missing credential fails here, before any network call.
#[instrument(skip_all)]
pub async fn generate_briefing(
    runtime: &RuntimeConfig,
    request: BriefingRequest,
) -> Result<BriefingResponse> {
    let mode = request.search_mode.unwrap_or_default();

    let llm_key = require_credential(
        &runtime.llm_api_key,
        "generation API key is not configured; set BRIEFCAST_LLM_API_KEY or save one with `briefcast config set`",
    )?;
    let chat = ChatClient::new(llm_key, &runtime.llm_base_url, &runtime.llm_model)?;

    let retrieval = match mode {
        SearchMode::Web => {
            let search_key = require_credential(
                &runtime.search_api_key,
                "search API key is not configured; set BRIEFCAST_SEARCH_API_KEY or save one with `briefcast config set`",
            )?;
            let reader_key = require_credential(
                &runtime.reader_api_key,
                "reader API key is not configured; set BRIEFCAST_READER_API_KEY or save one with `briefcast config set`",
            )?;
            Some(RetrievalClients {
                search: SearchClient::new(search_key)?,
                reader: ReaderClient::new(reader_key)?,
            })
        }
        SearchMode::Skip => None,
    };

    run_pipeline(&chat, retrieval, mode, request).await
}

/// The pipeline proper, parameterized by already-built clients.
pub(crate) async fn run_pipeline(
    chat: &ChatClient,
    retrieval: Option<RetrievalClients>,
    mode: SearchMode,
    request: BriefingRequest,
) -> Result<BriefingResponse> {
    let sections = normalize_sections(section_templates(), request.sections.as_deref());
    info!(sections = sections.len(), mode = ?mode, "starting briefing generation");

    // Sections are independent during gathering; launch them all and await
    // in template order so results line up with the request.
    let mut handles = Vec::with_capacity(sections.len());
    for section in sections {
        let clients = retrieval.clone();
        handles.push(tokio::spawn(gather_context(section, mode, clients)));
    }

    let mut contexts = Vec::with_capacity(handles.len());
    for handle in handles {
        let ctx = handle
            .await
            .map_err(|e| BriefcastError::Generation(format!("section gathering failed: {e}")))?;
        contexts.push(ctx);
    }

    // Generation runs one section at a time to bound backend load; a fatal
    // failure aborts the remaining sections with no partial response.
    let mut results = Vec::with_capacity(contexts.len());
    for ctx in contexts {
        let messages = build_prompt(&ctx);
        let content = chat.complete(&messages, GENERATION_TEMPERATURE).await?;
        info!(section = %ctx.runtime.template.id, chars = content.len(), "section generated");
        results.push(to_result(ctx, content));
    }

    Ok(BriefingResponse {
        sections: results,
        search_mode: mode,
    })
}

fn require_credential<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| BriefcastError::config(message))
}

/// Assemble the final section result, stripping body text from references.
fn to_result(ctx: SectionContext, content: String) -> SectionResult {
    let references = ctx
        .sources
        .into_iter()
        .map(|source| Reference {
            title: source.title,
            url: source.url,
            snippet: source.snippet,
        })
        .collect();

    SectionResult {
        id: ctx.runtime.template.id.clone(),
        title: ctx.runtime.template.title.clone(),
        duration_minutes: ctx.runtime.duration_minutes,
        target_words: ctx.runtime.target_words,
        content,
        references,
        used_queries: ctx.used_queries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefcast_shared::{ApiConfig, ConfigSource, SectionOverride};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn runtime_with(llm_base_url: &str, keys: [Option<&str>; 3]) -> RuntimeConfig {
        RuntimeConfig {
            search_api_key: keys[0].map(String::from),
            reader_api_key: keys[1].map(String::from),
            llm_api_key: keys[2].map(String::from),
            llm_base_url: llm_base_url.to_string(),
            llm_model: "deepseek-chat".to_string(),
            updated_at: None,
            source: ConfigSource::Environment,
        }
    }

    fn completion_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": text}}]
        })
    }

    #[tokio::test]
    async fn missing_generation_key_fails_before_any_call() {
        let runtime = runtime_with("https://api.deepseek.com", [Some("s"), Some("r"), None]);
        let err = generate_briefing(&runtime, BriefingRequest::default())
            .await
            .expect_err("error");
        assert!(err.to_string().contains("BRIEFCAST_LLM_API_KEY"));
    }

    #[tokio::test]
    async fn web_mode_requires_search_and_reader_keys() {
        let runtime = runtime_with("https://api.deepseek.com", [None, Some("r"), Some("g")]);
        let err = generate_briefing(&runtime, BriefingRequest::default())
            .await
            .expect_err("error");
        assert!(err.to_string().contains("BRIEFCAST_SEARCH_API_KEY"));

        let runtime = runtime_with("https://api.deepseek.com", [Some("s"), None, Some("g")]);
        let err = generate_briefing(&runtime, BriefingRequest::default())
            .await
            .expect_err("error");
        assert!(err.to_string().contains("BRIEFCAST_READER_API_KEY"));
    }

    #[tokio::test]
    async fn skip_mode_needs_only_the_generation_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                "Topic sentence.\n- Point one.\n[1] Title (https://example.com)",
            )))
            .mount(&server)
            .await;

        let runtime = runtime_with(&server.uri(), [None, None, Some("llm-key")]);
        let request = BriefingRequest {
            sections: None,
            search_mode: Some(SearchMode::Skip),
        };

        let response = generate_briefing(&runtime, request).await.expect("response");
        assert_eq!(response.search_mode, SearchMode::Skip);
        assert_eq!(response.sections.len(), 3);
        for section in &response.sections {
            assert!(section.references.is_empty());
            assert!(section.used_queries.is_empty());
            assert!(section.content.starts_with("Topic sentence."));
        }
    }

    #[tokio::test]
    async fn overrides_flow_through_to_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Generated.")))
            .mount(&server)
            .await;

        let runtime = runtime_with(&server.uri(), [None, None, Some("llm-key")]);
        let request = BriefingRequest {
            sections: Some(vec![SectionOverride {
                id: "headline-news".into(),
                prompt: Some("  Focus on storm recovery.  ".into()),
                duration_minutes: Some(2.0),
            }]),
            search_mode: Some(SearchMode::Skip),
        };

        let response = generate_briefing(&runtime, request).await.expect("response");
        let headline = &response.sections[0];
        assert_eq!(headline.id, "headline-news");
        assert_eq!(headline.duration_minutes, 2.0);
        // The catalog pins an explicit target for this section.
        assert_eq!(headline.target_words, 130);
    }

    #[tokio::test]
    async fn empty_completion_aborts_with_no_partial_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("")))
            .mount(&server)
            .await;

        let runtime = runtime_with(&server.uri(), [None, None, Some("llm-key")]);
        let request = BriefingRequest {
            sections: None,
            search_mode: Some(SearchMode::Skip),
        };

        let err = generate_briefing(&runtime, request).await.expect_err("error");
        assert!(matches!(err, BriefcastError::Generation(_)));
    }

    #[tokio::test]
    async fn web_mode_pipeline_carries_sources_into_references() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search_metadata": {"status": "Success"},
                "organic_results": [
                    {"title": "Story", "link": "https://example.com/story", "snippet": "summary"}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/reader"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": "extracted body"})),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Generated.")))
            .mount(&server)
            .await;

        let chat = ChatClient::new("llm-key", server.uri(), "deepseek-chat").expect("chat");
        let retrieval = RetrievalClients {
            search: SearchClient::new("s").expect("search").with_base_url(server.uri()),
            reader: ReaderClient::new("r").expect("reader").with_base_url(server.uri()),
        };

        let response = run_pipeline(
            &chat,
            Some(retrieval),
            SearchMode::Web,
            BriefingRequest::default(),
        )
        .await
        .expect("response");

        assert_eq!(response.search_mode, SearchMode::Web);
        assert_eq!(response.sections.len(), 3);
        for section in &response.sections {
            assert!(!section.used_queries.is_empty());
            assert!(!section.references.is_empty());
            // References carry title/url/snippet but never extracted bodies.
            assert_eq!(section.references[0].title, "Story");
            assert_eq!(section.references[0].snippet.as_deref(), Some("summary"));
        }
    }

    #[tokio::test]
    async fn response_shape_matches_the_wire_contract() {
        // Guard the serialized response shape consumed by callers.
        let response = BriefingResponse {
            sections: vec![],
            search_mode: SearchMode::Web,
        };
        let json = serde_json::to_string(&response).expect("serialize");
        assert_eq!(json, r#"{"sections":[],"search_mode":"web"}"#);

        let _config: ApiConfig = serde_json::from_str(r#"{"llm_api_key":"k"}"#).expect("parse");
    }
}
