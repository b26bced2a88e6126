//! ideaboard/crates/services/src/lib.rs
//!
//! Use-case layer: the user and idea domains, wired to storage and delivery
//! only through the port traits in `domains`.

pub mod idea;
pub mod locks;
pub mod user;

pub use idea::IdeaService;
pub use locks::{KeyGuard, KeyedLocks};
pub use user::UserService;
