//! OpenAI configuration

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 120;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the OpenAI integration
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key (bearer token)
    pub api_key: String,
    /// Chat model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token cap; an SMS needs very few
    pub max_tokens: u32,
    /// Per-request timeout
    pub timeout: Duration,
    /// API root, overridable for compatible endpoints
    pub base_url: String,
}

impl OpenAiConfig {
    /// Create a configuration with just an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
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

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("base_url", &self.base_url)
            .finish()
    }
}
