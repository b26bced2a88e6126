//! # integration-tests
//!
//! Fixtures shared by the end-to-end scenarios: services wired over the
//! in-memory stores, a notifier that records what it was asked to send, and
//! helpers for driving the HTTP router.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::bail;
use api_adapters::{router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use domains::{Delivery, Idea, NewIdea, Notification, Notifier, Role, User};
use http_body_util::BodyExt;
use serde_json::Value;
use services::{IdeaService, UserService};
use storage_adapters::{MemoryIdeaStore, MemoryUserStore};
use tower::ServiceExt;

pub const SUPER_ADMIN: &str = "root@ideaboard.test";
pub const ADMIN: &str = "admin@ideaboard.test";
pub const VISITOR: &str = "visitor@ideaboard.test";

/// Keeps every notification it is asked to send. Can be switched to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn fail_sends(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> anyhow::Result<Delivery> {
        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            bail!("mail relay unavailable");
        }
        let mut sent = self.sent();
        sent.push(notification.clone());
        Ok(Delivery {
            id: format!("<{}@test>", sent.len()),
            message: "Queued. Thank you.".into(),
        })
    }
}

/// Services wired over fresh in-memory stores, seeded with one user per role.
pub struct Harness {
    pub ideas: Arc<IdeaService>,
    pub users: Arc<UserService>,
    pub user_store: MemoryUserStore,
    pub idea_store: MemoryIdeaStore,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        let user_store = MemoryUserStore::new();
        let idea_store = MemoryIdeaStore::new();
        let notifier = Arc::new(RecordingNotifier::default());

        for (email, role) in [
            (SUPER_ADMIN, Role::SuperAdmin),
            (ADMIN, Role::Admin),
            (VISITOR, Role::Visitor),
        ] {
            user_store.seed(User::new(email, role, "Seeded", "NZ", Utc::now()));
        }

        let users = Arc::new(UserService::new(
            Arc::new(user_store.clone()),
            notifier.clone(),
        ));
        let ideas = Arc::new(IdeaService::new(Arc::new(idea_store.clone()), users.clone()));
        Self {
            ideas,
            users,
            user_store,
            idea_store,
            notifier,
        }
    }

    pub fn router(&self) -> Router {
        router(AppState::new(self.ideas.clone(), self.users.clone()))
    }

    /// Creates an idea authored by `author`, who must be an editor.
    pub async fn idea_by(&self, author: &str, summary: &str) -> Idea {
        self.ideas
            .create(NewIdea {
                author_email: author.into(),
                summary: summary.into(),
                content: format!("{summary}, in detail"),
                ..NewIdea::default()
            })
            .await
            .unwrap_or_else(|err| panic!("fixture idea not created: {err}"))
    }

    pub async fn user(&self, email: &str) -> User {
        self.users
            .get_user(email)
            .await
            .unwrap_or_else(|err| panic!("fixture user missing: {err}"))
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends one request through `app` and decodes the JSON body, if any.
pub async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let request = request
        .body(body)
        .unwrap_or_else(|err| panic!("bad request fixture: {err}"));

    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|err| panic!("router failed: {err}"));
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .unwrap_or_else(|err| panic!("body not readable: {err}"))
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}
