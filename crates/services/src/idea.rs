//! # IdeaService
//!
//! Idea CRUD, the filtered listing and the voting workflow. Author and
//! requester lookups go through [`UserService`].

use std::sync::Arc;

use chrono::Utc;
use domains::{
    DomainError, Idea, IdeaEdit, IdeaQuery, IdeaRepository, IdeaSelection, NewIdea, Result,
    VoteRequest,
};
use tracing::{error, info, instrument, warn};

use crate::locks::KeyedLocks;
use crate::user::{InternalUserUpdate, UserService};

pub struct IdeaService {
    repo: Arc<dyn IdeaRepository>,
    users: Arc<UserService>,
    locks: KeyedLocks,
}

impl IdeaService {
    pub fn new(repo: Arc<dyn IdeaRepository>, users: Arc<UserService>) -> Self {
        Self {
            repo,
            users,
            locks: KeyedLocks::new(),
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Idea> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| DomainError::idea_not_found(id))
    }

    #[instrument(skip(self, input), fields(author = %input.author_email))]
    pub async fn create(&self, input: NewIdea) -> Result<Idea> {
        let author = self.users.get_user(&input.author_email).await?;
        if !author.role.is_editor() {
            warn!(role = %author.role, "idea creation refused");
            return Err(DomainError::PermissionDenied(format!(
                "{} users cannot create ideas",
                author.role
            )));
        }

        let idea = Idea::new(input, Utc::now());
        self.repo.create(&idea).await?;
        info!(id = %idea.id, "idea created");

        self.repo.get(&idea.id).await?.ok_or_else(|| {
            DomainError::Internal(anyhow::anyhow!("idea {} vanished after insert", idea.id))
        })
    }

    /// Full replacement of the editable fields by an editor or the author.
    #[instrument(skip(self, edit), fields(requester = %edit.requester_user_email))]
    pub async fn update(&self, id: &str, edit: IdeaEdit) -> Result<Idea> {
        let _guard = self.locks.lock(id).await;
        let mut idea = self.get(id).await?;
        let requester = self.users.get_user(&edit.requester_user_email).await?;

        if !(requester.role.is_editor() || idea.is_authored_by(&requester.id)) {
            warn!(role = %requester.role, "idea edit refused");
            return Err(DomainError::PermissionDenied(
                "only editors and the author may edit an idea".into(),
            ));
        }

        idea.apply_edit(edit, Utc::now());
        self.repo.update(&idea).await?;
        info!(bad_flag = idea.bad_flag, reports = idea.issues_ips.len(), "idea updated");
        Ok(idea)
    }

    /// Returns the idea as it was before deletion.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Idea> {
        let _guard = self.locks.lock(id).await;
        let idea = self.get(id).await?;
        self.repo.delete(id).await?;
        info!("idea deleted");
        Ok(idea)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.repo.count().await?)
    }

    #[instrument(skip(self))]
    pub async fn query(&self, query: &IdeaQuery) -> Result<Vec<Idea>> {
        let selection = IdeaSelection::plan(query)?;
        Ok(self.repo.select(&selection).await?)
    }

    /// Records one vote per user and credits the voter's score.
    ///
    /// The score credit is a second, separate write: if it fails the vote
    /// stands and the failure is logged.
    #[instrument(skip(self, request), fields(idea = %request.idea_id, voter = %request.requester_user_email))]
    pub async fn vote(&self, request: VoteRequest) -> Result<Idea> {
        let _guard = self.locks.lock(&request.idea_id).await;
        let mut idea = self.get(&request.idea_id).await?;
        let voter = self.users.get_user(&request.requester_user_email).await?;

        idea.register_vote(&voter.id, Utc::now()).inspect_err(|err| {
            warn!(%err, "vote rejected");
        })?;
        self.repo.update(&idea).await?;
        info!(votes = idea.votes, "vote recorded");

        let credit = InternalUserUpdate {
            increase_score: true,
            ..InternalUserUpdate::default()
        };
        if let Err(err) = self.users.apply_internal(&voter.id, credit).await {
            error!(%err, "vote recorded but voter score was not credited");
        }
        Ok(idea)
    }
}
