//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the domain layer
//! interacts with external services.
//!
//! Implementations of these traits live in the integration crates.

pub mod services;

// Re-exports
pub use services::*;
