//! Twilio Integration for Callguard
//!
//! Sends SMS replies through the Twilio Messages API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use callguard_integration_twilio::{TwilioConfig, TwilioMessaging};
//!
//! let config = TwilioConfig::new("AC...", "auth-token", "+15005550006");
//! let messaging = TwilioMessaging::new(&config)?;
//! ```

mod client;
mod config;
mod integration;

pub use client::{MessageResource, TwilioClient};
pub use config::{TwilioConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use integration::TwilioMessaging;
