//! Section normalization: merge request overrides onto the template catalog.

use std::collections::HashMap;

use briefcast_shared::{
    SectionOverride, SectionRuntime, SectionTemplate, WORDS_PER_MINUTE,
};

/// Merge overrides onto templates, producing one runtime per template in
/// template-declared order.
///
/// Overrides never add or remove sections; they adjust prompt and duration
/// only. Identifiers not present in the catalog are silently ignored, and a
/// prompt that is empty after trimming falls back to the template default.
pub fn normalize_sections(
    templates: &'static [SectionTemplate],
    overrides: Option<&[SectionOverride]>,
) -> Vec<SectionRuntime> {
    let override_map: HashMap<&str, &SectionOverride> = overrides
        .unwrap_or_default()
        .iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    templates
        .iter()
        .map(|template| {
            let item = override_map.get(template.id.as_str());

            let duration_minutes = item
                .and_then(|o| o.duration_minutes)
                .unwrap_or(template.duration_minutes);

            let prompt = item
                .and_then(|o| o.prompt.as_deref())
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .unwrap_or_else(|| template.default_prompt.clone());

            SectionRuntime {
                template,
                prompt,
                duration_minutes,
                target_words: resolve_target_words(template, duration_minutes),
            }
        })
        .collect()
}

/// Resolve a section's word target.
///
/// An explicit template target always wins; otherwise the target derives
/// from the duration at the fixed words-per-minute rate.
pub fn resolve_target_words(template: &SectionTemplate, duration_minutes: f64) -> u32 {
    template
        .target_words
        .unwrap_or_else(|| (duration_minutes * WORDS_PER_MINUTE).round() as u32)
}
