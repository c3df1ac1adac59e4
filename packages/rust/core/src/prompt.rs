//! Prompt assembly: render a section context into a generation request.

use briefcast_llm::ChatMessage;
use briefcast_shared::{RetrievedSource, SectionContext};

/// Temperature for briefing generation, kept low for repeatable output.
pub const GENERATION_TEMPERATURE: f32 = 0.35;

/// Per-source budget of extracted body text included in the prompt.
const BODY_EXCERPT_CHARS: usize = 1200;

/// Stands in for the context block when retrieval produced nothing.
const EMPTY_CONTEXT_PLACEHOLDER: &str =
    "No fresh source material was retrieved; draft the overview from the section brief alone.";

const SYSTEM_PROMPT: &str = "You are the internal communications assistant that drafts the \
                             company's daily briefing. Every section you write must be ready to \
                             read aloud at a morning stand-up without further editing.";

/// Assemble the chat messages for one section.
pub fn build_prompt(ctx: &SectionContext) -> Vec<ChatMessage> {
    let content = [
        format!("Section: {}", ctx.runtime.template.title),
        format!(
            "Length target: {} minutes (about {} words)",
            ctx.runtime.duration_minutes, ctx.runtime.target_words
        ),
        format!("Brief: {}", ctx.runtime.prompt),
        "Source material:".to_string(),
        render_context_block(&ctx.sources),
        "Writing requirements:".to_string(),
        "- Write in English with the voice of an internal morning broadcast; keep paragraphs \
         tight."
            .to_string(),
        "- Open with one topic sentence, then bullet the key points, favoring the newest \
         material."
            .to_string(),
        "- Note the connection to company strategy, regional operations, or compliance learning \
         where it exists."
            .to_string(),
        "- End with a source index in the form [n] Title (URL).".to_string(),
    ]
    .join("\n");

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(content)]
}

/// Render the numbered source block, or the placeholder when empty.
fn render_context_block(sources: &[RetrievedSource]) -> String {
    if sources.is_empty() {
        return EMPTY_CONTEXT_PLACEHOLDER.to_string();
    }

    sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let mut lines = vec![format!("({}) Title: {}", index + 1, source.title)];
            if let Some(origin) = &source.origin {
                lines.push(format!("Origin: {origin}"));
            }
            lines.push(format!("URL: {}", source.url));
            if let Some(snippet) = &source.snippet {
                lines.push(format!("Snippet: {snippet}"));
            }
            if let Some(content) = &source.content {
                lines.push(format!("Excerpt: {}", excerpt(content, BODY_EXCERPT_CHARS)));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Take the first `max_chars` characters without splitting a code point.
fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
