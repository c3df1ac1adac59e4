//! Per-section context gathering: search, dedup, cap, hydrate.

use url::Url;

use briefcast_shared::{RetrievedSource, SearchMode, SectionContext, SectionRuntime};

use crate::reader::ReaderClient;
use crate::search::SearchClient;

/// Upper bound on sources kept per section, limiting extraction cost and
/// prompt size.
const SOURCE_CAP: usize = 6;

/// The pair of provider clients retrieval needs.
#[derive(Clone)]
pub struct RetrievalClients {
    pub search: SearchClient,
    pub reader: ReaderClient,
}

/// Gather retrieval context for one section.
///
/// Queries run strictly in declared order so later queries dedupe against
/// results already collected from earlier ones; body hydration for the
/// capped list runs concurrently. Per-query and per-fetch failures degrade
/// the context (fewer sources, missing bodies) but never escape. With
/// `SearchMode::Skip` (or no clients, which the caller rules out upstream
/// for web mode) no network call is made at all.
pub async fn gather_context(
    runtime: SectionRuntime,
    mode: SearchMode,
    clients: Option<RetrievalClients>,
) -> SectionContext {
    let clients = match (mode, clients) {
        (SearchMode::Web, Some(clients)) => clients,
        _ => {
            return SectionContext {
                runtime,
                sources: Vec::new(),
                used_queries: Vec::new(),
            };
        }
    };

    let mut used_queries = Vec::new();
    let mut collected: Vec<RetrievedSource> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for query in &runtime.template.search_queries {
        used_queries.push(query.query.clone());

        let hits = match clients.search.search(&query.query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(
                    section = %runtime.template.id,
                    query = %query.id,
                    error = %e,
                    "search query failed, continuing with remaining queries"
                );
                continue;
            }
        };

        for hit in hits {
            let key = normalize_url(&hit.url);
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            collected.push(RetrievedSource {
                title: hit.title,
                url: hit.url,
                snippet: hit.snippet,
                origin: Some(query.label.clone()),
                content: None,
            });
        }
    }

    collected.truncate(SOURCE_CAP);

    // Hydrate bodies concurrently; a failed fetch only loses that body.
    let mut handles = Vec::with_capacity(collected.len());
    for source in collected {
        let reader = clients.reader.clone();
        handles.push(tokio::spawn(async move {
            let content = match reader.extract(&source.url).await {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::warn!(url = %source.url, error = %e, "content extraction failed");
                    None
                }
            };
            RetrievedSource { content, ..source }
        }));
    }

    let mut sources = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(source) => sources.push(source),
            Err(e) => tracing::warn!(error = %e, "extraction task failed"),
        }
    }

    tracing::debug!(
        section = %runtime.template.id,
        sources = sources.len(),
        queries = used_queries.len(),
        "section context gathered"
    );

    SectionContext {
        runtime,
        sources,
        used_queries,
    }
}

/// Normalize a URL for deduplication (strip fragment, trailing slash).
fn normalize_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    url.set_fragment(None);
    let mut s = url.to_string();
    // Remove trailing slash for consistency (except root path)
    if s.ends_with('/') && s.matches('/').count() > 3 {
        s.pop();
    }
    s
}
