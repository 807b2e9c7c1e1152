//! OpenAI Chat Completions client

use std::time::Duration;

use callguard::{DomainError, GeneratedText, GenerationError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::OpenAiConfig;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// Chat Completions API client
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(config: &OpenAiConfig) -> Result<Self, DomainError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::http_client("openai", e))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Send `prompt` as a single user message and return the first choice
    pub async fn chat(&self, prompt: &str) -> Result<GeneratedText, GenerationError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        debug!(model = %self.config.model, prompt_len = prompt.len(), "Requesting chat completion");

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_transport_error(&e, self.config.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(&e, self.config.timeout))?;

        if !status.is_success() {
            return Err(map_http_error(status, &body));
        }

        parse_completion(&body)
    }
}

pub(crate) fn map_transport_error(err: &reqwest::Error, timeout: Duration) -> GenerationError {
    if err.is_timeout() {
        GenerationError::timeout(timeout)
    } else {
        GenerationError::Unavailable {
            message: err.to_string(),
        }
    }
}

pub(crate) fn map_http_error(status: StatusCode, body: &str) -> GenerationError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return GenerationError::RateLimited;
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| body.to_string());

    GenerationError::Api {
        status: status.as_u16(),
        message,
    }
}

pub(crate) fn parse_completion(body: &str) -> Result<GeneratedText, GenerationError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::InvalidResponse {
            message: e.to_string(),
        })?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidResponse {
            message: "No choices returned".to_string(),
        })?;

    let content = choice.message.content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    if choice.finish_reason.as_deref() == Some("length") {
        warn!(model = %parsed.model, "Completion cut off at the token limit");
    }

    let generated = GeneratedText::new(content, parsed.model);
    Ok(match parsed.usage {
        Some(usage) => generated.with_total_tokens(usage.total_tokens),
        None => generated,
    })
}
