//! Raw-input domain types: the per-query source bundle and its parts.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// One web-search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

// ---------------------------------------------------------------------------
// Scraped pages
// ---------------------------------------------------------------------------

/// A fetched page reduced to its main text and outbound links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// Normalized URL the page was fetched from.
    pub url: String,
    /// Extracted main text; empty when nothing could be extracted.
    pub text: String,
    /// Absolute outbound links, de-duplicated in first-seen order.
    pub links: Vec<String>,
}

/// A social profile link found on the primary site. Never fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub url: String,
    /// Registrable domain of the profile, e.g. `facebook.com`.
    pub platform: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingStats {
    pub total_pages_scraped: usize,
    pub social_profiles_found: usize,
}

// ---------------------------------------------------------------------------
// StepOutcome
// ---------------------------------------------------------------------------

/// Result of an optional pipeline step whose failure must not stop the run.
///
/// Serializes to the payload itself on success, `{"error": "..."}` on
/// failure and `{}` when the step was not attempted.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    Ok(T),
    Failed { error: String },
    Skipped,
}

impl<T> StepOutcome<T> {
    /// Turn a fallible step result into an outcome, logging the failure.
    pub fn capture<E: std::fmt::Display>(step: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => {
                tracing::warn!(step, error = %e, "step failed, continuing without it");
                Self::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn ok(&self) -> Option<&T> {
        match self {
            Self::Ok(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl<T> Default for StepOutcome<T> {
    fn default() -> Self {
        Self::Skipped
    }
}

impl<T: Serialize> Serialize for StepOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ok(value) => value.serialize(serializer),
            Self::Failed { error } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
            Self::Skipped => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceBundle
// ---------------------------------------------------------------------------

/// Everything collected for one query before synthesis. Written verbatim
/// to `sources.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBundle {
    pub query: String,
    /// Web-search results.
    pub cse: Vec<SearchItem>,
    pub primary_url: Option<String>,
    pub places: StepOutcome<Value>,
    pub place_details: StepOutcome<Value>,
    pub pagespeed: StepOutcome<Value>,
    pub scraped: Vec<ScrapedPage>,
    pub social_profiles: Vec<SocialProfile>,
    pub scraping_stats: ScrapingStats,
}
