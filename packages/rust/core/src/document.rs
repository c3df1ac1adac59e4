//! Markdown rendering of a finished briefing.

use briefcast_shared::BriefingResponse;

/// Render a briefing response as a markdown document.
pub fn render_markdown(response: &BriefingResponse) -> String {
    let mut out = String::new();
    out.push_str("# Daily Briefing\n\n");

    for section in &response.sections {
        out.push_str(&format!(
            "## {} ({} min, ~{} words)\n\n",
            section.title, section.duration_minutes, section.target_words
        ));
        out.push_str(section.content.trim());
        out.push_str("\n\n");

        if !section.references.is_empty() {
            out.push_str("### Sources\n\n");
            for (index, reference) in section.references.iter().enumerate() {
                out.push_str(&format!(
                    "{}. [{}]({})\n",
                    index + 1,
                    reference.title,
                    reference.url
                ));
            }
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefcast_shared::{Reference, SearchMode, SectionResult};

    fn section(title: &str, references: Vec<Reference>) -> SectionResult {
        SectionResult {
            id: "alpha".into(),
            title: title.into(),
            duration_minutes: 0.5,
            target_words: 130,
            content: "Topic sentence.\n- Key point.".into(),
            references,
            used_queries: vec![],
        }
    }

    #[test]
    fn renders_sections_with_reference_lists() {
        let response = BriefingResponse {
            sections: vec![section(
                "Headlines",
                vec![Reference {
                    title: "Story".into(),
                    url: "https://example.com/story".into(),
                    snippet: None,
                }],
            )],
            search_mode: SearchMode::Web,
        };

        let doc = render_markdown(&response);
        assert!(doc.starts_with("# Daily Briefing"));
        assert!(doc.contains("## Headlines (0.5 min, ~130 words)"));
        assert!(doc.contains("- Key point."));
        assert!(doc.contains("1. [Story](https://example.com/story)"));
    }

    #[test]
    fn omits_the_source_list_when_there_are_no_references() {
        let response = BriefingResponse {
            sections: vec![section("Headlines", vec![])],
            search_mode: SearchMode::Skip,
        };

        let doc = render_markdown(&response);
        assert!(!doc.contains("### Sources"));
    }
}
