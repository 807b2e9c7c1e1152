//! Twilio configuration

use std::time::Duration;

/// Default REST API root
pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com/2010-04-01";
/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the Twilio integration
#[derive(Clone)]
pub struct TwilioConfig {
    /// Account SID (also the basic-auth user)
    pub account_sid: String,
    /// Auth token (basic-auth password)
    pub auth_token: String,
    /// Sender phone number in E.164 format
    pub phone_number: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// REST API root, overridable for test doubles
    pub base_url: String,
}

impl TwilioConfig {
    /// Create a configuration from the credential pair and sender number
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            phone_number: phone_number.into(),
            timeout: DEFAULT_TIMEOUT,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}
