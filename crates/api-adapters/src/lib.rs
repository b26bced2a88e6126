//! # api-adapters
//!
//! The JSON-over-HTTP surface of Ideaboard. Handlers are thin: they extract
//! the payload, call a service and map [`domains::DomainError`] onto a status.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use services::{IdeaService, UserService};

pub use error::ApiError;
pub use metrics::Metrics;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub ideas: Arc<IdeaService>,
    pub users: Arc<UserService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(ideas: Arc<IdeaService>, users: Arc<UserService>) -> Self {
        Self {
            ideas,
            users,
            metrics: Arc::new(Metrics::new()),
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    use handlers::{ideas, users};

    Router::new()
        .route("/idea", post(ideas::create_idea))
        .route(
            "/idea/{id}",
            get(ideas::get_idea).put(ideas::update_idea).delete(ideas::delete_idea),
        )
        .route("/ideaCount", get(ideas::count_ideas))
        .route("/getIdeas", post(ideas::query_ideas))
        .route("/voteAnIdea", post(ideas::vote_idea))
        .route("/user", post(users::create_user))
        .route(
            "/user/{email}",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/userSignup/{email}/{code}", post(users::sign_up))
        .route("/userEmailConfirm/{email}/{code}", get(users::confirm_email))
        .route("/healthcheck", get(handlers::healthcheck))
        .route("/metrics", get(handlers::metrics))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::count_errors,
        ))
        .layer(middleware::cors_policy())
        .layer(middleware::propagate_request_id())
        .layer(middleware::trace_layer())
        .layer(middleware::set_request_id())
        .with_state(state)
}
