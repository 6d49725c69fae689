use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::error;

use domain::repositories::text_generation::TextGenerationClient;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Minimal Anthropic messages-API client built on reqwest.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorEnvelope {
    error: AnthropicErrorDetails,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    message: Option<String>,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (anthropic_error_type, anthropic_error_message) =
            match serde_json::from_str::<AnthropicErrorEnvelope>(&body) {
                Ok(envelope) => {
                    let details = envelope.error;
                    (details.type_, details.message)
                }
                Err(_) => (None, None),
            };

        error!(
            status = %status,
            anthropic_error_type = ?anthropic_error_type,
            anthropic_error_message = ?anthropic_error_message,
            response_body = %body,
            context = %context,
            "anthropic api request failed"
        );

        anyhow::bail!(
            "Anthropic API request failed: {} (status {})",
            context,
            status
        );
    }
}

#[async_trait]
impl TextGenerationClient for AnthropicClient {
    async fn generate(&self, prompt: String, max_tokens: u32, temperature: f32) -> Result<String> {
        // https://docs.anthropic.com/en/api/messages
        let payload = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "temperature": temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let resp = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create message").await?;

        #[derive(Deserialize)]
        struct MessageResp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: Option<String>,
        }

        let parsed: MessageResp = resp.json().await?;
        let text = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .context("Anthropic response contained no text block")?;

        Ok(text.trim().to_string())
    }
}
