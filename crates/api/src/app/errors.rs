use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use corebank_core::{AccountNumber, DomainError};

use crate::app::dto::ErrorResponse;

/// Map a domain error onto the HTTP surface.
///
/// `NotFound` deliberately covers both "absent" and "exists but not yours";
/// the status never distinguishes them.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_failed", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::InsufficientFunds => {
            json_error(StatusCode::BAD_REQUEST, "insufficient_funds", "not enough balance")
        }
        DomainError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Internal(msg) => {
            tracing::error!("internal error surfaced to a request: {msg}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: code,
            message: message.into(),
            fields: None,
        }),
    )
        .into_response()
}

/// One 400 carrying every field problem at once.
pub fn validation_errors(fields: HashMap<String, String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "validation_failed",
            message: "Validation failed".to_string(),
            fields: Some(fields),
        }),
    )
        .into_response()
}

pub fn forbidden() -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", "admin role required")
}

/// Parse a path segment as an account number.
///
/// A malformed number cannot name any account, so it reads as `NotFound`
/// rather than leaking that the format was the problem.
pub fn parse_account_number(raw: &str) -> Result<AccountNumber, axum::response::Response> {
    raw.parse::<AccountNumber>()
        .map_err(|_| domain_error_to_response(DomainError::NotFound))
}
