//! Language-model profile synthesis.

use contentprofiler_clients::{ChatMessage, ChatRequest, OpenAiClient};
use contentprofiler_shared::{ContentProfilerError, Profile, Result, SourceBundle};
use tracing::{info, instrument, warn};

use crate::truncate::{TruncationLimits, truncate_for_model};

pub const PROFILE_SYSTEM_PROMPT: &str = concat!(
    "You are an expert business analyst creating comprehensive content profiles for LLM chatbot training. \n",
    "Analyze multi-source data to produce detailed, factual business intelligence. \n",
    "Return strict JSON with keys: organization, services, faqs, voice, meta, products, team, policies, locations. \n",
    "- organization: { name, legalName?, description, phone?, email?, url, address?, hours?, social?:[], yearEstablished?, certifications?:[] } \n",
    "- services: array of { name, summary, details, bullets:[], benefits:[], pricing?, duration?, schemaServiceType? } \n",
    "- products: array of { name, description, category, features?:[], pricing? } \n",
    "- team: array of { name?, role?, bio?, specialties?:[] } \n",
    "- faqs: array of { q, a, category? } \n",
    "- policies: { payment?, cancellation?, privacy?, terms? } \n",
    "- locations: array of { name?, address?, phone?, hours?, services?:[] } \n",
    "- voice: { tone, brandTraits:[], readingLevel, personality, communicationStyle } \n",
    "- meta: { homepageTitle, homepageDescription, primaryKeywords:[], secondaryKeywords?:[], targetAudience?:[] } \n",
    "Extract maximum detail from provided sources. Use only factual information; if unknown, omit or use null."
);

const PROFILE_INSTRUCTION: &str =
    "Compile a content profile from these sources. Respond with JSON only.";

const PROFILE_TEMPERATURE: f64 = 0.2;

/// Serialize the truncated bundle the way every prompt embeds it.
pub(crate) fn bundle_json(sources: &SourceBundle) -> Result<String> {
    let truncated = truncate_for_model(sources, &TruncationLimits::default());
    serde_json::to_string(&truncated)
        .map_err(|e| ContentProfilerError::parse(format!("failed to serialize sources: {e}")))
}

/// Ask the model for a structured profile of the business in `sources`.
///
/// An empty or unparseable response yields an empty profile. Transport and
/// API errors are returned.
#[instrument(skip_all, fields(query = %sources.query))]
pub async fn synthesize_profile(llm: &OpenAiClient, sources: &SourceBundle) -> Result<Profile> {
    let request = ChatRequest::new(
        vec![
            ChatMessage::system(PROFILE_SYSTEM_PROMPT),
            ChatMessage::user(PROFILE_INSTRUCTION),
            ChatMessage::user(bundle_json(sources)?),
        ],
        PROFILE_TEMPERATURE,
    )
    .json_mode();

    let Some(content) = llm.chat(&request).await?.filter(|c| !c.trim().is_empty()) else {
        warn!("model returned no content, using an empty profile");
        return Ok(Profile::default());
    };

    match Profile::from_json_str(&content) {
        Ok(profile) => {
            info!(
                services = profile.services.len(),
                faqs = profile.faqs.len(),
                "profile synthesized"
            );
            Ok(profile)
        }
        Err(e) => {
            warn!(error = %e, "model returned an unusable profile, using an empty profile");
            Ok(Profile::default())
        }
    }
}
