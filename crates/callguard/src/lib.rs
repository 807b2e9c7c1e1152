//! Callguard Domain Library
//!
//! After-hours call screening: when a call arrives inside the after-hours
//! window, compose a reply with a hosted language model and send it back
//! to the caller by SMS.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: `CallRecord`
//!   - `value_objects/`: `AfterHoursWindow`, `GenerationFailurePolicy`
//!   - `errors/`: Domain and collaborator error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `services/`: `TextGenerationService`, `MessagingService`
//!
//! - **Services** (`services/`): The workflow
//!   - `MessageComposer`, `NotificationSender`, `CallRouter`, diagrams
//!
//! # Usage
//!
//! ```rust,ignore
//! use callguard::{CallRecord, CallRouter, MessageComposer, NotificationSender};
//!
//! let router = CallRouter::new(
//!     MessageComposer::new(generator, GenerationFailurePolicy::fallback()),
//!     NotificationSender::new(messaging, "+15005550006"),
//! );
//! let outcome = router.run(CallRecord::new("+923075861200", call_time)).await;
//! ```

pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use domain::{
    is_after_hours, AfterHoursWindow, CallRecord, ComposeFailure, DeliveryError, DomainError,
    GenerationError, GenerationFailurePolicy, DEFAULT_FALLBACK_MESSAGE, UNKNOWN_CALLER,
};
pub use ports::{GeneratedText, MessagingService, SentMessage, TextGenerationService};
pub use services::{
    CallRouter, Composition, DeliveryResult, MessageComposer, MessageSource, NotificationSender,
    PipelineFailure, PipelineOutcome, Stage, Terminal,
};
