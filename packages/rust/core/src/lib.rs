//! Core pipeline orchestration for briefcast.
//!
//! Ties together section normalization, context gathering, prompt assembly,
//! and generation into the end-to-end briefing workflow, and hosts the
//! dependency status prober and document rendering.

pub mod document;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod status;

pub use document::render_markdown;
pub use normalize::{normalize_sections, resolve_target_words};
pub use pipeline::generate_briefing;
pub use prompt::build_prompt;
pub use status::check_status;
