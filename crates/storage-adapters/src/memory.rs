//! # In-memory stores
//!
//! Process-local implementations of the repository ports. Ideas are kept in
//! insertion order so paginated listings behave like the Postgres adapter's
//! creation-ordered scan. Data is lost when the store is dropped.

use std::sync::Arc;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{Idea, IdeaOrder, IdeaRepository, IdeaSelection, User, UserRepository};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct MemoryIdeaStore {
    ideas: Arc<RwLock<Vec<Idea>>>,
}

impl MemoryIdeaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdeaRepository for MemoryIdeaStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Idea>> {
        Ok(self.ideas.read().await.iter().find(|i| i.id == id).cloned())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.ideas.read().await.len() as i64)
    }

    async fn create(&self, idea: &Idea) -> anyhow::Result<()> {
        let mut ideas = self.ideas.write().await;
        if ideas.iter().any(|i| i.id == idea.id) {
            bail!("idea {} already exists", idea.id);
        }
        ideas.push(idea.clone());
        Ok(())
    }

    async fn update(&self, idea: &Idea) -> anyhow::Result<()> {
        let mut ideas = self.ideas.write().await;
        let slot = ideas
            .iter_mut()
            .find(|i| i.id == idea.id)
            .ok_or_else(|| anyhow!("no idea with id {}", idea.id))?;
        *slot = idea.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        let mut ideas = self.ideas.write().await;
        let before = ideas.len();
        ideas.retain(|i| i.id != id);
        if ideas.len() == before {
            bail!("no idea with id {id}");
        }
        Ok(())
    }

    async fn select(&self, selection: &IdeaSelection) -> anyhow::Result<Vec<Idea>> {
        let ideas = self.ideas.read().await;
        let mut matched: Vec<&Idea> = ideas.iter().filter(|i| selection.matches(i)).collect();
        if selection.order == IdeaOrder::VotesDesc {
            matched.sort_by(|a, b| b.votes.cmp(&a.votes));
        }

        let offset = usize::try_from(selection.offset)?;
        let limit = usize::try_from(selection.limit)?;
        Ok(matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|idea| selection.projection.apply(idea.clone()))
            .collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user directly, bypassing the services.
    pub fn seed(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn get(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.get(email).map(|u| u.value().clone()))
    }

    async fn create(&self, user: &User) -> anyhow::Result<()> {
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => bail!("user {} already exists", user.id),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, user: &User) -> anyhow::Result<()> {
        let mut slot = self
            .users
            .get_mut(&user.id)
            .ok_or_else(|| anyhow!("no user with id {}", user.id))?;
        *slot = user.clone();
        Ok(())
    }

    async fn delete(&self, email: &str) -> anyhow::Result<()> {
        self.users
            .remove(email)
            .map(|_| ())
            .ok_or_else(|| anyhow!("no user with id {email}"))
    }
}
