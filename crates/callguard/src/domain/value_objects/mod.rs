//! Value Objects
//!
//! Immutable value types used by domain entities and services.

mod after_hours_window;
mod failure_policy;

pub use after_hours_window::*;
pub use failure_policy::*;
