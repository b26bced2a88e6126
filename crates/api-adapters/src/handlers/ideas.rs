//! Idea endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{Idea, IdeaEdit, IdeaQuery, NewIdea, VoteRequest};
use serde::Serialize;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

pub async fn get_idea(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Idea>, ApiError> {
    Ok(Json(state.ideas.get(&id).await?))
}

pub async fn create_idea(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewIdea>,
) -> Result<(StatusCode, Json<Idea>), ApiError> {
    let idea = state.ideas.create(input).await?;
    state.metrics.ideas_created.inc();
    Ok((StatusCode::CREATED, Json(idea)))
}

pub async fn update_idea(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(edit): ApiJson<IdeaEdit>,
) -> Result<Json<Idea>, ApiError> {
    Ok(Json(state.ideas.update(&id, edit).await?))
}

pub async fn delete_idea(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Idea>, ApiError> {
    Ok(Json(state.ideas.delete(&id).await?))
}

pub async fn count_ideas(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = state.ideas.count().await?;
    Ok(Json(CountResponse { count }))
}

pub async fn query_ideas(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<IdeaQuery>,
) -> Result<Json<Vec<Idea>>, ApiError> {
    Ok(Json(state.ideas.query(&query).await?))
}

pub async fn vote_idea(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VoteRequest>,
) -> Result<Json<Idea>, ApiError> {
    let idea = state.ideas.vote(request).await?;
    state.metrics.votes_cast.inc();
    Ok(Json(idea))
}
