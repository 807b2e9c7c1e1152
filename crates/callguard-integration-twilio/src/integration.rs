//! MessagingService implementation for Twilio

use async_trait::async_trait;
use callguard::{DeliveryError, DomainError, MessagingService, SentMessage};
use tracing::debug;

use crate::client::TwilioClient;
use crate::config::TwilioConfig;

/// Twilio integration implementing the MessagingService port
pub struct TwilioMessaging {
    client: TwilioClient,
}

impl TwilioMessaging {
    /// Create a new Twilio integration
    pub fn new(config: &TwilioConfig) -> Result<Self, DomainError> {
        let client = TwilioClient::new(config)?;
        Ok(Self { client })
    }

    /// Configured sender number
    pub fn sender_number(&self) -> &str {
        &self.client.config().phone_number
    }
}

#[async_trait]
impl MessagingService for TwilioMessaging {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<SentMessage, DeliveryError> {
        let resource = self.client.create_message(from, to, body).await?;
        debug!(sid = %resource.sid, status = ?resource.status, "Twilio accepted message");

        let sent = SentMessage::new(resource.sid);
        Ok(match resource.status {
            Some(status) => sent.with_status(status),
            None => sent,
        })
    }

    fn name(&self) -> &str {
        "twilio"
    }
}
