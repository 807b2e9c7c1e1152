//! Notification Sender - one SMS delivery attempt per call
//!
//! Wraps the messaging collaborator so that nothing escapes as an error:
//! every failure becomes a [`DeliveryResult::Failed`]. There is no retry and
//! no idempotency key, so two calls are two attempts.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::errors::DeliveryError;
use crate::ports::MessagingService;

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DeliveryResult {
    Accepted {
        message_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },
    Failed {
        reason: String,
        error: DeliveryError,
    },
}

impl DeliveryResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DeliveryResult::Accepted { .. })
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            DeliveryResult::Accepted { message_id, .. } => Some(message_id),
            DeliveryResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&DeliveryError> {
        match self {
            DeliveryResult::Accepted { .. } => None,
            DeliveryResult::Failed { error, .. } => Some(error),
        }
    }
}

impl From<DeliveryError> for DeliveryResult {
    fn from(error: DeliveryError) -> Self {
        DeliveryResult::Failed {
            reason: error.to_string(),
            error,
        }
    }
}

pub struct NotificationSender {
    messaging: Arc<dyn MessagingService>,
    from: String,
}

impl NotificationSender {
    /// Create a sender that delivers from the `from` address
    pub fn new(messaging: Arc<dyn MessagingService>, from: impl Into<String>) -> Self {
        Self {
            messaging,
            from: from.into(),
        }
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// Attempt delivery of `body` to `to`
    pub async fn send(&self, to: &str, body: &str) -> DeliveryResult {
        match self.messaging.send(&self.from, to, body).await {
            Ok(sent) => {
                info!(
                    provider = %self.messaging.name(),
                    to = %to,
                    message_id = %sent.id,
                    "SMS accepted"
                );
                DeliveryResult::Accepted {
                    message_id: sent.id,
                    status: sent.status,
                }
            }
            Err(e) => {
                warn!(provider = %self.messaging.name(), to = %to, error = %e, "SMS delivery failed");
                DeliveryResult::from(e)
            }
        }
    }
}
