//! # Ports
//!
//! Any storage or delivery adapter must implement these traits to be wired
//! into the services. Lookups return `Ok(None)` for absent records; errors
//! are reserved for infrastructure failures.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{Idea, User};
use crate::query::IdeaSelection;

/// Data persistence contract for ideas.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdeaRepository: Send + Sync {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Idea>>;
    async fn count(&self) -> anyhow::Result<i64>;
    async fn create(&self, idea: &Idea) -> anyhow::Result<()>;
    async fn update(&self, idea: &Idea) -> anyhow::Result<()>;
    async fn delete(&self, id: &str) -> anyhow::Result<()>;
    /// Runs a filtered, ordered, paginated listing.
    async fn select(&self, selection: &IdeaSelection) -> anyhow::Result<Vec<Idea>>;
}

/// Data persistence contract for users, keyed by email.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn create(&self, user: &User) -> anyhow::Result<()>;
    async fn update(&self, user: &User) -> anyhow::Result<()>;
    async fn delete(&self, email: &str) -> anyhow::Result<()>;
}

/// A templated message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Asks the recipient to confirm ownership of `email` with `code`.
    ConfirmEmail { email: String, code: String },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::ConfirmEmail { email, .. } => email,
        }
    }
}

/// Receipt returned by the delivery backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub message: String,
}

/// Outbound message delivery contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> anyhow::Result<Delivery>;
}
