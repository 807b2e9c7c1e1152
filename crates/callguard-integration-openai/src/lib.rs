//! OpenAI Integration for Callguard
//!
//! Generates SMS replies with the OpenAI Chat Completions API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use callguard_integration_openai::{OpenAiConfig, OpenAiTextGeneration};
//!
//! let config = OpenAiConfig::new("sk-...").with_temperature(0.3);
//! let generation = OpenAiTextGeneration::new(&config)?;
//! ```

mod client;
mod config;
mod integration;

pub use client::OpenAiClient;
pub use config::{
    OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT,
};
pub use integration::OpenAiTextGeneration;
