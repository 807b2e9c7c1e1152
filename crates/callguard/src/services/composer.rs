//! Message Composer - turns a caller and a call time into an SMS reply
//!
//! Delegates the wording to the text-generation collaborator using a fixed
//! prompt template. What happens when the collaborator fails is decided by
//! the configured [`GenerationFailurePolicy`].

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::errors::{ComposeFailure, GenerationError};
use crate::domain::value_objects::GenerationFailurePolicy;
use crate::ports::{GeneratedText, TextGenerationService};

/// Single-segment SMS length; longer replies are logged, not truncated
pub const SMS_CHAR_LIMIT: usize = 160;

/// Render the instruction prompt for a caller and call time
pub fn build_prompt(caller_name: &str, call_time: &NaiveDateTime) -> String {
    format!(
        "Someone named {name} called me at {time} on {date}.\n\
         \n\
         Write a polite but firm SMS reply that:\n\
         1. Explains I don't take calls after 2 AM\n\
         2. Offers to schedule a meeting during business hours (9 AM - 6 PM)\n\
         3. Asks them to reply with their email and preferred meeting time\n\
         4. Stays under {limit} characters\n\
         \n\
         Keep it professional but friendly. Reply with the SMS text only.",
        name = caller_name,
        time = call_time.format("%I:%M %p"),
        date = call_time.format("%B %d, %Y"),
        limit = SMS_CHAR_LIMIT,
    )
}

/// Where the composed text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    Generated,
    Fallback,
}

/// A composed reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub text: String,
    pub source: MessageSource,
    /// Set when the fallback replaced a failed generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_error: Option<GenerationError>,
}

pub struct MessageComposer {
    generator: Arc<dyn TextGenerationService>,
    policy: GenerationFailurePolicy,
}

impl MessageComposer {
    pub fn new(generator: Arc<dyn TextGenerationService>, policy: GenerationFailurePolicy) -> Self {
        Self { generator, policy }
    }

    pub fn policy(&self) -> &GenerationFailurePolicy {
        &self.policy
    }

    /// Compose a reply for `caller_name` calling at `call_time`
    pub async fn compose(
        &self,
        caller_name: &str,
        call_time: &NaiveDateTime,
    ) -> Result<Composition, ComposeFailure> {
        let prompt = build_prompt(caller_name, call_time);

        let error = match self.generate(&prompt).await {
            Ok(generated) => {
                info!(
                    provider = %self.generator.provider_name(),
                    model = %generated.model,
                    total_tokens = ?generated.total_tokens,
                    length = generated.text.chars().count(),
                    "Reply generated"
                );
                warn_if_long(&generated.text);
                return Ok(Composition {
                    text: generated.text,
                    source: MessageSource::Generated,
                    generation_error: None,
                });
            }
            Err(e) => e,
        };

        match &self.policy {
            GenerationFailurePolicy::Fallback(text) if !text.trim().is_empty() => {
                warn!(error = %error, "Text generation failed, using fallback message");
                warn_if_long(text);
                Ok(Composition {
                    text: text.clone(),
                    source: MessageSource::Fallback,
                    generation_error: Some(error),
                })
            }
            _ => {
                warn!(error = %error, "Text generation failed");
                Err(ComposeFailure::from(error))
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedText, GenerationError> {
        let mut generated = self.generator.generate(prompt).await?;
        let trimmed = generated.text.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        generated.text = trimmed.to_string();
        Ok(generated)
    }
}

fn warn_if_long(text: &str) {
    let length = text.chars().count();
    if length > SMS_CHAR_LIMIT {
        warn!(length, limit = SMS_CHAR_LIMIT, "Reply exceeds a single SMS segment");
    }
}
