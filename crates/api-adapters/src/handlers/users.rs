//! User endpoints, including the signup and email confirmation flow.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{DeleteUserRequest, Delivery, NewUser, User, UserEdit};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get_user(&email).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.users.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    ApiJson(edit): ApiJson<UserEdit>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.update_user(&email, edit).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    ApiJson(request): ApiJson<DeleteUserRequest>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.delete_user(&email, request).await?))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Path((email, code)): Path<(String, String)>,
) -> Result<Json<Delivery>, ApiError> {
    let delivery = state.users.sign_up(&email, &code).await?;
    state.metrics.signups_sent.inc();
    Ok(Json(delivery))
}

pub async fn confirm_email(
    State(state): State<AppState>,
    Path((email, code)): Path<(String, String)>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.authenticate(&email, &code).await?))
}
