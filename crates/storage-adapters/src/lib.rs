//! # storage-adapters
//!
//! Implementations of the `IdeaRepository` and `UserRepository` ports.
//! The in-memory stores are always compiled; Postgres sits behind the
//! `db-postgres` feature.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::{MemoryIdeaStore, MemoryUserStore};
#[cfg(feature = "db-postgres")]
pub use postgres::{PgIdeaRepository, PgUserRepository};
