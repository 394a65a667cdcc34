use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::token::TokenError;

/// AppError
///
/// The single error type crossing the HTTP boundary. Every handler, gate and
/// store returns it, and `IntoResponse` turns it into a status plus a JSON
/// `{ "message": ... }` body.
#[derive(Debug, Error)]
pub enum AppError {
    /// No `Authorization: Bearer <token>` header.
    #[error("unauthorized access")]
    Unauthorized,

    /// A token was presented but failed verification. Answered with 401, not 403.
    #[error("forbidden-access")]
    InvalidToken,

    /// Authenticated, but not allowed to touch this resource.
    #[error("forbidden access")]
    Forbidden,

    #[error("not found")]
    NotFound,

    /// Malformed identifier or request payload.
    #[error("{0}")]
    BadRequest(String),

    /// Database or payment provider failure.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

/// ErrorBody
///
/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Infrastructure details stay in the logs.
        let message = match &self {
            Self::Upstream(detail) => {
                tracing::error!(error = %detail, "upstream failure");
                "internal server error".to_string()
            }
            other => {
                tracing::debug!(status = %status, error = %other, "request rejected");
                other.to_string()
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Upstream(format!("database: {err}"))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(format!("payment provider: {err}"))
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => Self::InvalidToken,
            TokenError::Signing(detail) => Self::Upstream(detail),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Parses a path identifier, turning garbage into `BadRequest` instead of a crash.
pub fn parse_id(raw: &str) -> Result<uuid::Uuid, AppError> {
    uuid::Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid identifier: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_token_keeps_401() {
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn parse_id_rejects_malformed_input() {
        assert!(matches!(parse_id("not-an-id"), Err(AppError::BadRequest(_))));
        assert!(parse_id("6f1c2b9e-8a4d-4f0e-9b7a-3c2d1e0f9a8b").is_ok());
    }
}
