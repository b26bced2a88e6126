pub mod ideas;
pub mod users;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use tracing::error;

use crate::AppState;

pub async fn healthcheck() -> &'static str {
    "OK"
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "application/openmetrics-text; version=1.0.0; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(%err, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
