//! Maps domain failures onto HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] JsonRejection),
}

/// Attached to error responses so middleware can count them by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorKind(pub &'static str);

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => match err {
                DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                DomainError::BadRequest(_) => StatusCode::BAD_REQUEST,
                DomainError::Conflict(_) | DomainError::SelfVote | DomainError::DuplicateVote => {
                    StatusCode::CONFLICT
                }
                DomainError::AuthCodeMismatch => StatusCode::UNAUTHORIZED,
                DomainError::Notification(_) => StatusCode::BAD_GATEWAY,
                DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MalformedPayload(_) => "bad_request",
            ApiError::Domain(err) => err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = ?self, "request failed");
            "internal service error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (status, Json(ErrorBody { error: kind, message })).into_response();
        response.extensions_mut().insert(ErrorKind(kind));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_kinds_map_to_statuses() {
        let cases = [
            (DomainError::idea_not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::PermissionDenied("no".into()), StatusCode::FORBIDDEN),
            (DomainError::BadRequest("no".into()), StatusCode::BAD_REQUEST),
            (DomainError::DuplicateVote, StatusCode::CONFLICT),
            (DomainError::SelfVote, StatusCode::CONFLICT),
            (DomainError::AuthCodeMismatch, StatusCode::UNAUTHORIZED),
            (DomainError::Notification("down".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_details_are_hidden() {
        let response =
            ApiError::from(DomainError::Internal(anyhow::anyhow!("pool timed out"))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.extensions().get::<ErrorKind>(), Some(&ErrorKind("internal")));
    }
}
