//! In-memory collaborators for unit tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::errors::{DeliveryError, GenerationError};
use crate::ports::{GeneratedText, MessagingService, SentMessage, TextGenerationService};

/// Returns a fixed reply and records every prompt
pub struct ScriptedGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerationService for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedText, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(GeneratedText::new(self.reply.clone(), "scripted-1").with_total_tokens(42))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// Always fails with the given error
pub struct FailingGenerator {
    error: GenerationError,
}

impl FailingGenerator {
    pub fn new(error: GenerationError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl TextGenerationService for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedText, GenerationError> {
        Err(self.error.clone())
    }

    fn provider_name(&self) -> &str {
        "failing"
    }
}

#[derive(Debug, Clone)]
pub struct SentSms {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// Accepts every message and hands out sequential ids
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentSms>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingService for RecordingMessenger {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<SentMessage, DeliveryError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentSms {
            from: from.to_string(),
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(SentMessage::new(format!("SM{:04}", sent.len())).with_status("queued"))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Rejects every message and counts attempts
pub struct FailingMessenger {
    error: DeliveryError,
    attempts: Mutex<usize>,
}

impl FailingMessenger {
    pub fn new(error: DeliveryError) -> Self {
        Self {
            error,
            attempts: Mutex::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl MessagingService for FailingMessenger {
    async fn send(
        &self,
        _from: &str,
        _to: &str,
        _body: &str,
    ) -> Result<SentMessage, DeliveryError> {
        *self.attempts.lock().unwrap() += 1;
        Err(self.error.clone())
    }

    fn name(&self) -> &str {
        "failing"
    }
}
