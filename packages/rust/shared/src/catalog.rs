//! The static section-template catalog.
//!
//! Loaded once at process start and handed out by reference; requests never
//! copy or mutate it. Overrides adjust prompt and duration only.

use std::sync::OnceLock;

use crate::types::{SearchQuery, SectionTemplate};

static CATALOG: OnceLock<Vec<SectionTemplate>> = OnceLock::new();

/// All briefing sections in broadcast order.
pub fn section_templates() -> &'static [SectionTemplate] {
    CATALOG.get_or_init(build_catalog)
}

/// Look up a template by identifier.
pub fn template_by_id(id: &str) -> Option<&'static SectionTemplate> {
    section_templates().iter().find(|t| t.id == id)
}

fn query(id: &str, label: &str, text: &str) -> SearchQuery {
    SearchQuery {
        id: id.into(),
        label: label.into(),
        query: text.into(),
    }
}

fn build_catalog() -> Vec<SectionTemplate> {
    vec![
        SectionTemplate {
            id: "headline-news".into(),
            title: "National & International Headlines".into(),
            duration_minutes: 0.5,
            target_words: Some(130),
            recommended_sources: vec![
                "National evening news".into(),
                "Wire services".into(),
                "Major dailies".into(),
            ],
            default_prompt: "Summarize the day's most consequential national and international \
                             stories, favoring energy strategy, technology, and macro policy, \
                             and close with one line on what they mean for company planning."
                .into(),
            search_queries: vec![query(
                "national-international",
                "Wire services",
                "(site:reuters.com OR site:apnews.com OR site:bloomberg.com) \
                 (intitle:\"energy\" OR intitle:\"power\" OR intitle:\"grid\" OR \"policy\") \
                 -intitle:\"live\" -intitle:\"replay\"",
            )],
        },
        SectionTemplate {
            id: "industry-regional".into(),
            title: "Power Industry & Regional Updates".into(),
            duration_minutes: 1.0,
            target_words: Some(260),
            recommended_sources: vec![
                "Utility trade press".into(),
                "Grid operator releases".into(),
                "District government news".into(),
            ],
            default_prompt: "Focus on sector policy, supply reliability, digital transformation, \
                             and major regional projects; write one broadcast-ready passage that \
                             helps staff track industry trends and local developments."
                .into(),
            search_queries: vec![
                query(
                    "industry-press",
                    "Trade press & regulators",
                    "(site:utilitydive.com OR site:energy.gov) \
                     (grid OR \"load growth\" OR reliability OR \"demand response\" OR \
                     transmission OR \"grid modernization\")",
                ),
                query(
                    "district-news",
                    "District government",
                    "(intitle:riverside OR intitle:\"river district\") \
                     (utility OR grid OR \"major project\" OR technology) -site:riverside.gov",
                ),
            ],
        },
        SectionTemplate {
            id: "governance-learning".into(),
            title: "Governance & Compliance Study".into(),
            duration_minutes: 0.5,
            target_words: Some(130),
            recommended_sources: vec![
                "Company code of conduct".into(),
                "Regulator bulletins".into(),
                "Case studies".into(),
            ],
            default_prompt: "Condense one study note covering a governance update, a compliance \
                             reminder, and a key term worth explaining, suitable for a quick \
                             read-out at the morning stand-up."
                .into(),
            search_queries: vec![query(
                "compliance",
                "Regulator bulletins",
                "(site:sec.gov OR site:justice.gov OR site:ferc.gov) \
                 (compliance OR enforcement OR \"consent decree\" OR governance OR ethics)",
            )],
        },
    ]
}
