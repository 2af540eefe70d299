//! Shrinks a [`SourceBundle`] before it is sent to the language model.

use contentprofiler_shared::{SourceBundle, StepOutcome};
use serde_json::{Value, json};
use tracing::warn;

pub const PAGE_TEXT_MARKER: &str = "... [truncated]";
pub const SNIPPET_MARKER: &str = "...";
pub const PAGESPEED_SUMMARY: &str = "PageSpeed data available but truncated for processing";

/// Per-field limits, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationLimits {
    pub page_text_chars: usize,
    pub snippet_chars: usize,
    /// Soft budget for the serialized bundle. Only logged when exceeded.
    pub max_total_chars: usize,
}

impl Default for TruncationLimits {
    fn default() -> Self {
        Self {
            page_text_chars: 8_000,
            snippet_chars: 500,
            max_total_chars: 50_000,
        }
    }
}

/// Return a copy of `sources` with long page text and snippets cut and any
/// full PageSpeed report replaced by a one-line summary.
pub fn truncate_for_model(sources: &SourceBundle, limits: &TruncationLimits) -> SourceBundle {
    let mut truncated = sources.clone();

    for page in &mut truncated.scraped {
        cut(&mut page.text, limits.page_text_chars, PAGE_TEXT_MARKER);
    }
    for item in &mut truncated.cse {
        cut(&mut item.snippet, limits.snippet_chars, SNIPPET_MARKER);
    }
    if matches!(&truncated.pagespeed, StepOutcome::Ok(report) if has_lighthouse_report(report)) {
        truncated.pagespeed = StepOutcome::Ok(json!({ "summary": PAGESPEED_SUMMARY }));
    }

    let total = serde_json::to_string(&truncated)
        .map(|s| s.chars().count())
        .unwrap_or_default();
    if total > limits.max_total_chars {
        warn!(
            total,
            budget = limits.max_total_chars,
            "source bundle exceeds model budget after truncation"
        );
    }

    truncated
}

fn cut(text: &mut String, limit: usize, marker: &str) {
    if let Some((byte_idx, _)) = text.char_indices().nth(limit) {
        text.truncate(byte_idx);
        text.push_str(marker);
    }
}

/// Whether a PageSpeed payload still carries a full Lighthouse report.
pub fn has_lighthouse_report(value: &Value) -> bool {
    value.get("lighthouseResult").is_some()
}
