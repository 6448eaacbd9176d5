use anyhow::Context;
use async_trait::async_trait;
use podify_core::{ChatMessage, LLMProvider, LLMResponse, Role, Usage};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    max_output_tokens: u32,
}

impl GeminiProvider {
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        info!("Creating GeminiProvider");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_output_tokens: 1000,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub const fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Build a `generateContent` body.
    ///
    /// System messages become `systemInstruction`; the rest keep their order
    /// as `contents`, with assistant turns sent under Gemini's `model` role.
    fn build_request(&self, messages: &[ChatMessage]) -> Value {
        let system_text = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let contents: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = if m.role == Role::Assistant {
                    "model"
                } else {
                    "user"
                };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();

        let mut request = json!({
            "contents": contents,
            "generationConfig": { "maxOutputTokens": self.max_output_tokens },
        });

        if !system_text.is_empty() {
            request["systemInstruction"] = json!({ "parts": [{ "text": system_text }] });
        }

        request
    }

    async fn try_send(&self, model: &str, request: &Value) -> anyhow::Result<LLMResponse> {
        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        parse_response(&response)
    }
}

fn token_count(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

fn parse_response(response: &Value) -> anyhow::Result<LLMResponse> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing candidate parts"))?;

    let content = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect::<String>();

    if content.is_empty() {
        anyhow::bail!("Invalid response format: candidate has no text");
    }

    let usage = response["usageMetadata"].as_object().map(|u| Usage {
        prompt_tokens: token_count(u.get("promptTokenCount")),
        completion_tokens: token_count(u.get("candidatesTokenCount")),
        total_tokens: token_count(u.get("totalTokenCount")),
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse> {
        let request = self.build_request(messages);

        info!("Sending request to Gemini API: model={}", model);
        debug!("Gemini request carries {} messages", messages.len());

        let response = self.try_send(model, &request).await?;

        info!("Received response from Gemini API");
        Ok(response)
    }

    fn get_default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }
}
