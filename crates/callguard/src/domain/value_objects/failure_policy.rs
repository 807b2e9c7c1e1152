//! GenerationFailurePolicy - what to do when the text generator fails

use serde::{Deserialize, Serialize};

/// Static reply used when generation is skipped or fails
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Hi! I don't take calls after 2 AM. Please reply with your email and preferred meeting time (9 AM-6 PM) to schedule a meeting. Thanks!";

/// Policy applied by the message composer on generation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "message", rename_all = "snake_case")]
pub enum GenerationFailurePolicy {
    /// Surface the failure to the router
    Propagate,
    /// Substitute a static message
    Fallback(String),
}

impl GenerationFailurePolicy {
    /// Fallback with the built-in static message
    pub fn fallback() -> Self {
        Self::Fallback(DEFAULT_FALLBACK_MESSAGE.to_string())
    }
}

impl Default for GenerationFailurePolicy {
    fn default() -> Self {
        Self::fallback()
    }
}

impl std::fmt::Display for GenerationFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationFailurePolicy::Propagate => write!(f, "propagate"),
            GenerationFailurePolicy::Fallback(_) => write!(f, "fallback"),
        }
    }
}

impl std::str::FromStr for GenerationFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propagate" => Ok(GenerationFailurePolicy::Propagate),
            "fallback" => Ok(GenerationFailurePolicy::fallback()),
            _ => Err(format!("Unknown generation failure policy: {}", s)),
        }
    }
}
