//! ideaboard/crates/domains/src/lib.rs
//!
//! Entities, request payloads, the idea selection plan and the port traits
//! shared by every other Ideaboard crate.

pub mod error;
pub mod models;
pub mod query;
pub mod requests;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use query::*;
pub use requests::*;
pub use traits::*;
