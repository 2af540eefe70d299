//! Product ideas, website audit and sales pitches as markdown.

use contentprofiler_clients::{ChatMessage, ChatRequest, OpenAiClient};
use contentprofiler_shared::{Result, SourceBundle};
use tracing::instrument;

use crate::synthesize::bundle_json;

pub const IDEAS_SYSTEM_PROMPT: &str = concat!(
    "You are a senior fullstack architect and product strategist.\n",
    "Given multi-source business context, produce:\n",
    "1) A detailed markdown report with 6-10 product/tool ideas tailored to the business.\n",
    "Each idea must include: Name, Use Case, Why It Helps (business impact), Tech Stack (frontend, backend, data, AI libs),\n",
    "Implementation Outline (steps), and SEFA integration guidance.\n",
    "2) A website audit section covering robots.txt, llm.txt, sitemap.xml with explicit improvement actions.\n",
    "Focus on realistic, implementable solutions. Be specific."
);

pub const PITCHES_SYSTEM_PROMPT: &str = concat!(
    "You are a sales engineer. Generate 8-12 concise 'foot-in-the-door' two-to-three-line pitches.\n",
    "Each pitch should be tailored to the business, concrete, and outcome-driven.\n",
    "No fluff. Keep each to max 240 characters. Output as a markdown list."
);

const IDEAS_INSTRUCTION: &str =
    "Produce the report now in Markdown. Include sections: Product Ideas and Website Audit.";
const PITCHES_INSTRUCTION: &str = "Generate the pitches as a markdown list now.";

/// Product/tool ideas plus a website audit. Empty when the model returns nothing.
#[instrument(skip_all, fields(query = %sources.query))]
pub async fn generate_ideas_markdown(llm: &OpenAiClient, sources: &SourceBundle) -> Result<String> {
    markdown_completion(llm, sources, IDEAS_SYSTEM_PROMPT, IDEAS_INSTRUCTION, 0.3).await
}

/// Short outreach pitches as a markdown list. Empty when the model returns nothing.
#[instrument(skip_all, fields(query = %sources.query))]
pub async fn generate_pitches_markdown(
    llm: &OpenAiClient,
    sources: &SourceBundle,
) -> Result<String> {
    markdown_completion(llm, sources, PITCHES_SYSTEM_PROMPT, PITCHES_INSTRUCTION, 0.5).await
}

async fn markdown_completion(
    llm: &OpenAiClient,
    sources: &SourceBundle,
    system: &str,
    instruction: &str,
    temperature: f64,
) -> Result<String> {
    let request = ChatRequest::new(
        vec![
            ChatMessage::system(system),
            ChatMessage::user(instruction),
            ChatMessage::user(bundle_json(sources)?),
        ],
        temperature,
    );
    Ok(llm.chat(&request).await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::llm_client;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn ideas_use_their_prompt_and_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "temperature": 0.3,
                "messages": [{"role": "system", "content": IDEAS_SYSTEM_PROMPT}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "## Product Ideas\n"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let md = generate_ideas_markdown(&llm_client(&server), &SourceBundle::default())
            .await
            .unwrap();
        assert_eq!(md, "## Product Ideas\n");
    }

    #[tokio::test]
    async fn pitches_are_empty_when_model_returns_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"temperature": 0.5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .expect(1)
            .mount(&server)
            .await;

        let md = generate_pitches_markdown(&llm_client(&server), &SourceBundle::default())
            .await
            .unwrap();
        assert!(md.is_empty());
    }
}
