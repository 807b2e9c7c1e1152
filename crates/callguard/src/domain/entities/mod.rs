//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - CallRecord: an incoming call and the screening progress made on it

mod call_record;

pub use call_record::*;
