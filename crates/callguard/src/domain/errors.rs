//! Domain Errors
//!
//! Error types for domain operations and the two collaborators.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Whole seconds reported for a timeout, rounded up so sub-second limits never read as 0s
fn timeout_secs(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to build HTTP client for {service}: {reason}")]
    HttpClient { service: String, reason: String },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl DomainError {
    pub fn config_missing<T: AsRef<str>>(key: T) -> Self {
        Self::ConfigMissing {
            key: key.as_ref().to_string(),
        }
    }

    pub fn invalid_config<T: AsRef<str>>(key: T, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn http_client(service: impl Into<String>, reason: impl ToString) -> Self {
        Self::HttpClient {
            service: service.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failures of the text-generation collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationError {
    #[error("Text generation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Text generation unavailable: {message}")]
    Unavailable { message: String },

    #[error("Text generation API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Text generation rate limited")]
    RateLimited,

    #[error("Invalid text generation response: {message}")]
    InvalidResponse { message: String },

    #[error("Text generation returned empty content")]
    EmptyResponse,
}

impl GenerationError {
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout {
            secs: timeout_secs(after),
        }
    }
}

/// Failures of the messaging collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryError {
    #[error("Delivery timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Delivery transport error: {message}")]
    Transport { message: String },

    #[error("Delivery rejected ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("Invalid delivery response: {message}")]
    InvalidResponse { message: String },
}

impl DeliveryError {
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout {
            secs: timeout_secs(after),
        }
    }
}

/// The message composer could not produce a reply
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("Failed to compose reply: {source}")]
pub struct ComposeFailure {
    #[source]
    pub source: GenerationError,
}

impl From<GenerationError> for ComposeFailure {
    fn from(source: GenerationError) -> Self {
        Self { source }
    }
}
