//! Service Ports
//!
//! Abstract interfaces for the two hosted collaborators.

mod messaging;
mod text_generation;

pub use messaging::*;
pub use text_generation::*;
