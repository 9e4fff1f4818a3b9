//! Registration, login, and logout.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use corebank_auth::NewUser;

use crate::app::dto::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::BearerToken;

pub fn public_router() -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn protected_router() -> Router {
    Router::new().route("/auth/logout", post(logout))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> axum::response::Response {
    let mut fields = HashMap::new();
    if body.email.trim().is_empty() || !body.email.contains('@') {
        fields.insert("email".to_string(), "must be a valid email address".to_string());
    }
    if body.password.len() < 8 {
        fields.insert(
            "password".to_string(),
            "must be at least 8 characters".to_string(),
        );
    }
    if body.first_name.trim().is_empty() {
        fields.insert("first_name".to_string(), "must not be blank".to_string());
    }
    if body.last_name.trim().is_empty() {
        fields.insert("last_name".to_string(), "must not be blank".to_string());
    }
    if body.phone_number.trim().is_empty() {
        fields.insert("phone_number".to_string(), "must not be blank".to_string());
    }
    if !fields.is_empty() {
        return errors::validation_errors(fields);
    }

    match services.users.register(NewUser {
        email: body.email,
        password: body.password,
        first_name: body.first_name,
        last_name: body.last_name,
        phone_number: body.phone_number,
    }) {
        Ok(user) => {
            tracing::info!("principal registered: {}", user.email);
            (StatusCode::CREATED, Json(UserResponse::from(user))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    let user = match services.users.verify_credentials(&body.email, &body.password) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.token_issuer().issue(&user) {
        Ok(token) => (StatusCode::OK, Json(TokenResponse { token })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Revoke exactly the credential this request presented.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(bearer): Extension<BearerToken>,
) -> axum::response::Response {
    services.revocations.revoke(bearer.token, bearer.expires_at);
    StatusCode::NO_CONTENT.into_response()
}
