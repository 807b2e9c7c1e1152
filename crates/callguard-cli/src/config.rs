//! Configuration loading for Callguard
//!
//! Everything is read once at startup from the process environment
//! (after `.env` has been loaded). Credentials are only demanded by the
//! commands that talk to the hosted services.

use std::time::Duration;

use callguard::{AfterHoursWindow, DomainError, GenerationFailurePolicy};
use callguard_integration_openai::OpenAiConfig;
use callguard_integration_twilio::TwilioConfig;

pub const TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const TWILIO_PHONE_NUMBER: &str = "TWILIO_PHONE_NUMBER";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const OPENAI_TEMPERATURE: &str = "OPENAI_TEMPERATURE";
pub const TIMEOUT_SECS: &str = "CALLGUARD_TIMEOUT_SECS";
pub const AFTER_HOURS_START: &str = "CALLGUARD_AFTER_HOURS_START";
pub const AFTER_HOURS_END: &str = "CALLGUARD_AFTER_HOURS_END";
pub const ON_GENERATION_FAILURE: &str = "CALLGUARD_ON_GENERATION_FAILURE";
pub const FALLBACK_MESSAGE: &str = "CALLGUARD_FALLBACK_MESSAGE";

/// Credentials needed for real sends
pub const REQUIRED_KEYS: [&str; 4] = [
    TWILIO_ACCOUNT_SID,
    TWILIO_AUTH_TOKEN,
    TWILIO_PHONE_NUMBER,
    OPENAI_API_KEY,
];

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Startup settings
#[derive(Debug, Clone)]
pub struct Settings {
    twilio_account_sid: Option<String>,
    twilio_auth_token: Option<String>,
    pub twilio_phone_number: Option<String>,
    openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub openai_temperature: Option<f32>,
    pub timeout: Duration,
    pub window: AfterHoursWindow,
    pub failure_policy: GenerationFailurePolicy,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through `lookup`; blank values count as absent
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = parse_or(&get, TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(DomainError::invalid_config(TIMEOUT_SECS, "must be positive"));
        }

        let openai_temperature = get(OPENAI_TEMPERATURE)
            .map(|raw| {
                raw.parse::<f32>()
                    .ok()
                    .filter(|t| (0.0..=2.0).contains(t))
                    .ok_or_else(|| {
                        DomainError::invalid_config(
                            OPENAI_TEMPERATURE,
                            format!("expected a number between 0 and 2, got '{}'", raw),
                        )
                    })
            })
            .transpose()?;

        let defaults = AfterHoursWindow::default();
        let start = parse_or(&get, AFTER_HOURS_START, defaults.start_hour())?;
        let end = parse_or(&get, AFTER_HOURS_END, defaults.end_hour())?;
        let window = AfterHoursWindow::new(start, end)
            .map_err(|e| DomainError::invalid_config(AFTER_HOURS_START, e.to_string()))?;

        let failure_policy = match get(ON_GENERATION_FAILURE) {
            Some(raw) => raw
                .parse::<GenerationFailurePolicy>()
                .map_err(|e| DomainError::invalid_config(ON_GENERATION_FAILURE, e))?,
            None => GenerationFailurePolicy::default(),
        };
        let failure_policy = match (failure_policy, get(FALLBACK_MESSAGE)) {
            (GenerationFailurePolicy::Fallback(_), Some(text)) => {
                GenerationFailurePolicy::Fallback(text)
            }
            (policy, _) => policy,
        };

        Ok(Self {
            twilio_account_sid: get(TWILIO_ACCOUNT_SID),
            twilio_auth_token: get(TWILIO_AUTH_TOKEN),
            twilio_phone_number: get(TWILIO_PHONE_NUMBER),
            openai_api_key: get(OPENAI_API_KEY),
            openai_model: get(OPENAI_MODEL),
            openai_temperature,
            timeout: Duration::from_secs(timeout_secs),
            window,
            failure_policy,
        })
    }

    /// Twilio configuration; fails if any credential is missing
    pub fn twilio_config(&self) -> Result<TwilioConfig, DomainError> {
        let sid = required(&self.twilio_account_sid, TWILIO_ACCOUNT_SID)?;
        let token = required(&self.twilio_auth_token, TWILIO_AUTH_TOKEN)?;
        let number = required(&self.twilio_phone_number, TWILIO_PHONE_NUMBER)?;
        Ok(TwilioConfig::new(sid, token, number).with_timeout(self.timeout))
    }

    /// OpenAI configuration; fails if the API key is missing
    pub fn openai_config(&self) -> Result<OpenAiConfig, DomainError> {
        let key = required(&self.openai_api_key, OPENAI_API_KEY)?;
        let mut config = OpenAiConfig::new(key).with_timeout(self.timeout);
        if let Some(model) = &self.openai_model {
            config = config.with_model(model.clone());
        }
        if let Some(temperature) = self.openai_temperature {
            config = config.with_temperature(temperature);
        }
        Ok(config)
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, DomainError> {
    value
        .as_deref()
        .ok_or_else(|| DomainError::config_missing(key))
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T, DomainError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| DomainError::invalid_config(key, format!("cannot parse '{}'", raw))),
        None => Ok(default),
    }
}

/// Mask a secret for display: long values keep 8 leading and 4 trailing
/// characters, short ones keep 3 leading characters
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 10 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        let head: String = chars.iter().take(3).collect();
        format!("{}...", head)
    }
}
