//! # DomainError
//!
//! Centralized error handling for the Ideaboard domain.
//! Every operation reports one of these kinds so callers can map them to
//! transport-level responses.

use thiserror::Error;

/// The primary error type for all idea and user operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Entity absent (idea, user, requester)
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Role lattice or authorship check failed, or the role is unknown
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Malformed or out-of-range input
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource already exists (e.g., duplicate user email)
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("a user cannot vote on their own idea")]
    SelfVote,

    #[error("user has already voted on this idea")]
    DuplicateVote,

    #[error("auth code doesn't match")]
    AuthCodeMismatch,

    /// The notifier failed to deliver a message
    #[error("notification failed: {0}")]
    Notification(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn idea_not_found(id: impl Into<String>) -> Self {
        Self::NotFound { entity: "idea", id: id.into() }
    }

    pub fn user_not_found(email: impl Into<String>) -> Self {
        Self::NotFound { entity: "user", id: email.into() }
    }

    /// Stable machine-readable name of the kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::BadRequest(_) => "bad_request",
            Self::Conflict(_) => "conflict",
            Self::SelfVote => "self_vote",
            Self::DuplicateVote => "duplicate_vote",
            Self::AuthCodeMismatch => "auth_code_mismatch",
            Self::Notification(_) => "notification_failed",
            Self::Internal(_) => "internal",
        }
    }
}

/// A specialized Result type for Ideaboard logic.
pub type Result<T> = std::result::Result<T, DomainError>;
