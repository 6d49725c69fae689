pub mod anthropic_client;
pub mod openai_client;

use anyhow::Result;
use async_trait::async_trait;

use domain::repositories::text_generation::TextGenerationClient;

use self::anthropic_client::AnthropicClient;
use self::openai_client::OpenAiClient;

/// The configured text-generation backend behind one concrete type, so
/// callers generic over `TextGenerationClient` need no boxing.
pub enum AiTextClient {
    OpenAi(OpenAiClient),
    Anthropic(AnthropicClient),
}

pub struct AiCredentials {
    pub openai_api_key: String,
    pub openai_model: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
}

impl AiTextClient {
    /// Unknown provider strings fall back to OpenAI.
    pub fn from_provider(provider: &str, credentials: AiCredentials) -> Self {
        match provider {
            "anthropic" => AiTextClient::Anthropic(AnthropicClient::new(
                credentials.anthropic_api_key,
                credentials.anthropic_model,
            )),
            _ => AiTextClient::OpenAi(OpenAiClient::new(
                credentials.openai_api_key,
                credentials.openai_model,
            )),
        }
    }
}

#[async_trait]
impl TextGenerationClient for AiTextClient {
    async fn generate(&self, prompt: String, max_tokens: u32, temperature: f32) -> Result<String> {
        match self {
            AiTextClient::OpenAi(client) => client.generate(prompt, max_tokens, temperature).await,
            AiTextClient::Anthropic(client) => {
                client.generate(prompt, max_tokens, temperature).await
            }
        }
    }
}
