use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::error;

use domain::repositories::text_generation::TextGenerationClient;

/// Minimal OpenAI chat-completions client built on reqwest.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: OpenAiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

impl OpenAiClient {
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

        let (openai_error_type, openai_error_code, openai_error_message) =
            match serde_json::from_str::<OpenAiErrorEnvelope>(&body) {
                Ok(envelope) => {
                    let details = envelope.error;
                    (details.type_, details.code, details.message)
                }
                Err(_) => (None, None, None),
            };

        error!(
            status = %status,
            openai_error_type = ?openai_error_type,
            openai_error_code = ?openai_error_code,
            openai_error_message = ?openai_error_message,
            response_body = %body,
            context = %context,
            "openai api request failed"
        );

        anyhow::bail!("OpenAI API request failed: {} (status {})", context, status);
    }
}

#[async_trait]
impl TextGenerationClient for OpenAiClient {
    async fn generate(&self, prompt: String, max_tokens: u32, temperature: f32) -> Result<String> {
        // https://platform.openai.com/docs/api-reference/chat/create
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "chat completion").await?;

        #[derive(Deserialize)]
        struct CompletionResp {
            choices: Vec<CompletionChoice>,
        }

        #[derive(Deserialize)]
        struct CompletionChoice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: Option<String>,
        }

        let parsed: CompletionResp = resp.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("OpenAI response contained no completion text")?;

        Ok(content.trim().to_string())
    }
}
