//! Offline collaborators for `callguard simulate`

use async_trait::async_trait;
use callguard::{
    DeliveryError, GeneratedText, GenerationError, MessagingService, SentMessage,
    TextGenerationService,
};
use tracing::info;
use uuid::Uuid;

/// Sender used when no Twilio number is configured (Twilio's test number)
pub const DRY_RUN_SENDER: &str = "+15005550006";

/// Returns the same text for every prompt
pub struct StaticTextGeneration {
    text: String,
}

impl StaticTextGeneration {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl TextGenerationService for StaticTextGeneration {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedText, GenerationError> {
        Ok(GeneratedText::new(self.text.clone(), "static"))
    }

    fn provider_name(&self) -> &str {
        "static"
    }
}

/// Accepts every message without sending anything
pub struct DryRunMessaging;

#[async_trait]
impl MessagingService for DryRunMessaging {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<SentMessage, DeliveryError> {
        let sid = format!("SM{}", Uuid::new_v4().simple());
        info!(from = %from, to = %to, body_len = body.len(), sid = %sid, "Dry run: SMS not sent");
        Ok(SentMessage::new(sid).with_status("queued"))
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
