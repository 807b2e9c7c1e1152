//! Messaging Port
//!
//! Abstract interface for a hosted SMS provider.
//!
//! Implementations live in separate crates
//! (e.g., callguard-integration-twilio).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DeliveryError;

/// Provider acknowledgement of an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    /// Opaque provider-assigned identifier
    pub id: String,
    /// Provider status at acceptance time (e.g., "queued")
    pub status: Option<String>,
}

impl SentMessage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Messaging collaborator
///
/// Every call is one delivery attempt: no retry, no deduplication.
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Request delivery of `body` from `from` to `to`
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<SentMessage, DeliveryError>;

    /// Get the provider name (e.g., "twilio")
    fn name(&self) -> &str;
}
