use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

#[async_trait]
#[automock]
pub trait TextGenerationClient {
    async fn generate(&self, prompt: String, max_tokens: u32, temperature: f32) -> Result<String>;
}
