//! # UserService
//!
//! Role-lattice permission checks, user CRUD and the email confirmation flow.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Delivery, DeleteUserRequest, DomainError, NewUser, Notification, Notifier, Result, Role,
    User, UserEdit, UserRepository,
};
use tracing::{info, instrument, warn};

use crate::locks::KeyedLocks;

/// Sub-fields other domain operations apply without a permission check.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct InternalUserUpdate {
    pub increase_score: bool,
    /// Stores a fresh auth code and clears `is_auth`.
    pub reset_auth_code: Option<String>,
    pub authenticate: bool,
    /// Checked against the stored code under the lock before anything changes.
    pub expected_code: Option<String>,
}

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    locks: KeyedLocks,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            locks: KeyedLocks::new(),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, email: &str) -> Result<User> {
        self.repo
            .get(email)
            .await?
            .ok_or_else(|| DomainError::user_not_found(email))
    }

    /// Succeeds with the parsed `target_role` when the requester exists and
    /// may administer that role.
    #[instrument(skip(self))]
    pub async fn check_permission(&self, requester_email: &str, target_role: &str) -> Result<Role> {
        let requester = self.get_user(requester_email).await?;
        let target: Role = target_role.parse()?;

        if !requester.role.can_administer(target) {
            warn!(requester = %requester.id, role = %requester.role, %target, "permission denied");
            return Err(DomainError::PermissionDenied(format!(
                "{} users cannot manage {} users",
                requester.role, target
            )));
        }
        Ok(target)
    }

    #[instrument(skip(self, input), fields(requester = %input.requester_user_email, email = %input.email_address))]
    pub async fn create_user(&self, input: NewUser) -> Result<User> {
        validate_email(&input.email_address)?;
        let role = self
            .check_permission(&input.requester_user_email, &input.role)
            .await?;

        let _guard = self.locks.lock(&input.email_address).await;
        if self.repo.get(&input.email_address).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "user {} already exists",
                input.email_address
            )));
        }

        let user = User::new(input.email_address, role, input.name, input.country, Utc::now());
        self.repo.create(&user).await?;
        info!(%role, "user created");

        self.repo
            .get(&user.id)
            .await?
            .ok_or_else(|| DomainError::Internal(anyhow::anyhow!("user {} vanished after insert", user.id)))
    }

    /// Profile change requested by an external caller, gated by `edit.role`.
    #[instrument(skip(self, edit), fields(requester = %edit.requester_user_email))]
    pub async fn update_user(&self, email: &str, edit: UserEdit) -> Result<User> {
        let _guard = self.locks.lock(email).await;
        let mut user = self.get_user(email).await?;
        let role = self
            .check_permission(&edit.requester_user_email, &edit.role)
            .await?;

        user.name = edit.name;
        user.country = edit.country;
        user.role = role;
        user.updated_at = Utc::now();

        self.repo.update(&user).await?;
        info!("user updated");
        Ok(user)
    }

    /// Bypass path for signup, voting and authentication. Never exposed to
    /// callers outside this crate.
    pub(crate) async fn apply_internal(&self, email: &str, update: InternalUserUpdate) -> Result<User> {
        let _guard = self.locks.lock(email).await;
        let mut user = self.get_user(email).await?;

        if let Some(code) = update.expected_code.as_deref() {
            if !user.auth_code_matches(code) {
                warn!("auth code mismatch");
                return Err(DomainError::AuthCodeMismatch);
            }
        }
        if update.increase_score {
            user.score += 1;
        }
        if let Some(code) = update.reset_auth_code {
            user.auth_code = code;
            user.is_auth = false;
        }
        if update.authenticate {
            user.is_auth = true;
        }
        user.updated_at = Utc::now();

        self.repo.update(&user).await?;
        Ok(user)
    }

    #[instrument(skip(self, request), fields(requester = %request.requester_user_email))]
    pub async fn delete_user(&self, email: &str, request: DeleteUserRequest) -> Result<User> {
        let _guard = self.locks.lock(email).await;
        let user = self.get_user(email).await?;
        self.check_permission(&request.requester_user_email, user.role.as_str())
            .await?;

        self.repo.delete(email).await?;
        info!("user deleted");
        Ok(user)
    }

    /// Sends the confirmation mail, then stores `code` as the user's auth code.
    /// Nothing is persisted when delivery fails.
    #[instrument(skip(self, code))]
    pub async fn sign_up(&self, email: &str, code: &str) -> Result<Delivery> {
        if code.is_empty() {
            return Err(DomainError::BadRequest("auth code must not be empty".into()));
        }
        self.get_user(email).await?;

        let notification = Notification::ConfirmEmail {
            email: email.to_string(),
            code: code.to_string(),
        };
        let delivery = self.notifier.send(&notification).await.map_err(|err| {
            warn!(error = %err, "confirmation mail not sent");
            DomainError::Notification(err.to_string())
        })?;

        self.apply_internal(
            email,
            InternalUserUpdate {
                reset_auth_code: Some(code.to_string()),
                ..InternalUserUpdate::default()
            },
        )
        .await?;
        info!(delivery = %delivery.id, "confirmation mail sent");
        Ok(delivery)
    }

    #[instrument(skip(self, code))]
    pub async fn authenticate(&self, email: &str, code: &str) -> Result<User> {
        self.apply_internal(
            email,
            InternalUserUpdate {
                authenticate: true,
                expected_code: Some(code.to_string()),
                ..InternalUserUpdate::default()
            },
        )
        .await
    }
}

fn validate_email(email: &str) -> Result<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::BadRequest(format!(
            "`{email}` is not a valid email address"
        ))),
    }
}
