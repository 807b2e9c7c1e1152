//! Text Generation Port
//!
//! The composer hands a hosted language model one prompt and gets one piece
//! of text back. Request format and sampling settings belong to the adapter.

use async_trait::async_trait;

use crate::domain::errors::GenerationError;

/// Text produced by the collaborator, plus what the composer logs about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText {
    pub text: String,
    /// Model that answered; providers may report a dated snapshot of the requested one
    pub model: String,
    /// Total tokens billed, when the provider reports usage
    pub total_tokens: Option<u32>,
}

impl GeneratedText {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            total_tokens: None,
        }
    }

    pub fn with_total_tokens(mut self, total_tokens: u32) -> Self {
        self.total_tokens = Some(total_tokens);
        self
    }
}

/// Text generation collaborator
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Turn a single prompt into text
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, GenerationError>;

    /// Provider label for logs (e.g., "openai")
    fn provider_name(&self) -> &str;
}
