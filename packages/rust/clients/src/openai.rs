//! OpenAI chat completions client.

use contentprofiler_shared::{Credentials, OpenAiSettings, Result};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::http::HttpClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Overrides the client's configured model when set.
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    /// Ask for a JSON object response.
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>, temperature: f64) -> Self {
        Self {
            model: None,
            messages,
            temperature,
            json_mode: false,
        }
    }

    pub fn json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(http: HttpClient, credentials: &Credentials, settings: &OpenAiSettings) -> Self {
        Self {
            http,
            api_key: credentials.openai_api_key.clone(),
            endpoint: format!(
                "{}/chat/completions",
                settings.base_url.trim_end_matches('/')
            ),
            model: settings.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run a chat completion and return the first choice's content.
    ///
    /// `None` when the response carries no choices or a null content.
    #[instrument(skip_all, fields(model = request.model.as_deref().unwrap_or(&self.model), messages = request.messages.len()))]
    pub async fn chat(&self, request: &ChatRequest) -> Result<Option<String>> {
        let mut body = json!({
            "model": request.model.as_deref().unwrap_or(&self.model),
            "messages": request.messages,
            "temperature": request.temperature,
        });
        if request.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let auth = format!("Bearer {}", self.api_key);
        let response = self
            .http
            .post_json(&self.endpoint, &[("Authorization", auth.as_str())], &body)
            .await?;

        if let Some(usage) = response.get("usage") {
            debug!(
                prompt_tokens = usage.get("prompt_tokens").and_then(serde_json::Value::as_u64),
                completion_tokens = usage.get("completion_tokens").and_then(serde_json::Value::as_u64),
                "chat completion usage"
            );
        }

        Ok(first_choice_content(&response))
    }
}

fn first_choice_content(response: &Value) -> Option<String> {
    response
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}
