//! CallRecord - one incoming call threaded through the screening pipeline
//!
//! Created fresh per invocation, mutated in place by each pipeline step,
//! discarded once the router reaches a terminal state.

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::value_objects::AfterHoursWindow;

/// Display name used when the caller is not identified
pub const UNKNOWN_CALLER: &str = "unknown";

/// An incoming call and the pipeline progress made on it
///
/// The mutators enforce the progression order: a message can only be
/// set after the call was classified as after-hours, delivery can only
/// be marked with a non-empty message, and the follow-up marker only
/// after delivery.
///
/// Records are serialized into outcomes but never read back, so the
/// mutators stay the only way to advance one:
///
/// ```compile_fail
/// fn from_json<T: serde::de::DeserializeOwned>() {}
/// from_json::<callguard::CallRecord>();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRecord {
    id: Uuid,
    caller_number: String,
    caller_name: String,
    call_time: NaiveDateTime,
    after_hours: bool,
    message: String,
    delivery_attempted: bool,
    follow_up_scheduled: bool,
}

impl CallRecord {
    /// Create a new record for a call from `caller_number` at `call_time`
    pub fn new(caller_number: impl Into<String>, call_time: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            caller_number: caller_number.into(),
            caller_name: UNKNOWN_CALLER.to_string(),
            call_time,
            after_hours: false,
            message: String::new(),
            delivery_attempted: false,
            follow_up_scheduled: false,
        }
    }

    /// Set the caller display name; blank names keep the sentinel
    pub fn with_caller_name(mut self, name: Option<impl Into<String>>) -> Self {
        let name: Option<String> = name.map(Into::into);
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            self.caller_name = name;
        }
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn caller_number(&self) -> &str {
        &self.caller_number
    }

    pub fn caller_name(&self) -> &str {
        &self.caller_name
    }

    pub fn call_time(&self) -> NaiveDateTime {
        self.call_time
    }

    pub fn is_after_hours(&self) -> bool {
        self.after_hours
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn has_message(&self) -> bool {
        !self.message.is_empty()
    }

    pub fn delivery_attempted(&self) -> bool {
        self.delivery_attempted
    }

    pub fn follow_up_scheduled(&self) -> bool {
        self.follow_up_scheduled
    }

    /// Derive the after-hours flag from the call time
    pub fn classify(&mut self, window: &AfterHoursWindow) -> bool {
        self.after_hours = window.contains(&self.call_time);
        self.after_hours
    }

    /// Treat the call as after-hours regardless of the clock
    pub fn force_after_hours(&mut self) {
        self.after_hours = true;
    }

    /// Store the composed reply
    pub fn set_message(&mut self, message: impl Into<String>) -> Result<(), DomainError> {
        if !self.after_hours {
            return Err(DomainError::Validation(
                "cannot compose a message for a call within hours".into(),
            ));
        }
        let message = message.into();
        if message.trim().is_empty() {
            return Err(DomainError::Validation("composed message is empty".into()));
        }
        self.message = message;
        Ok(())
    }

    /// Record that one delivery attempt was made
    pub fn mark_delivery_attempted(&mut self) -> Result<(), DomainError> {
        if self.message.is_empty() {
            return Err(DomainError::Validation(
                "cannot attempt delivery without a composed message".into(),
            ));
        }
        self.delivery_attempted = true;
        Ok(())
    }

    /// Set the cosmetic follow-up marker
    pub fn mark_follow_up(&mut self) -> Result<(), DomainError> {
        if !self.delivery_attempted {
            return Err(DomainError::Validation(
                "cannot schedule a follow-up before delivery".into(),
            ));
        }
        self.follow_up_scheduled = true;
        Ok(())
    }
}
