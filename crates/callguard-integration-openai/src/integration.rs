//! TextGenerationService implementation for OpenAI

use async_trait::async_trait;
use callguard::{DomainError, GeneratedText, GenerationError, TextGenerationService};

use crate::client::OpenAiClient;
use crate::config::OpenAiConfig;

/// OpenAI integration implementing the TextGenerationService port
pub struct OpenAiTextGeneration {
    client: OpenAiClient,
}

impl OpenAiTextGeneration {
    /// Create a new OpenAI integration
    pub fn new(config: &OpenAiConfig) -> Result<Self, DomainError> {
        let client = OpenAiClient::new(config)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TextGenerationService for OpenAiTextGeneration {
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, GenerationError> {
        self.client.chat(prompt).await
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
