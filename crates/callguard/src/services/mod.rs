//! Application Services
//!
//! The screening workflow: compose a reply, send it, and route a call
//! record through both.

pub mod composer;
pub mod diagram;
pub mod router;
pub mod sender;

#[cfg(test)]
pub(crate) mod fakes;

pub use composer::{build_prompt, Composition, MessageComposer, MessageSource, SMS_CHAR_LIMIT};
pub use router::{
    next_state, CallRouter, PipelineFailure, PipelineOutcome, RouteState, Stage, Terminal,
    MAX_ROUTER_STEPS,
};
pub use sender::{DeliveryResult, NotificationSender};
