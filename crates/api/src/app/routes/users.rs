//! The authenticated principal's own profile.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};

use corebank_auth::ProfileUpdate;

use crate::app::dto::{ChangePasswordRequest, UpdateProfileRequest, UserResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::{AuthContext, BearerToken};

pub fn router() -> Router {
    Router::new()
        .route("/users/me", get(me).put(update_me))
        .route("/users/me/password", patch(change_password))
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.users.get(ctx.user_id()) {
        Ok(user) => Json(UserResponse::from(user)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<UpdateProfileRequest>,
) -> axum::response::Response {
    let update = ProfileUpdate {
        first_name: body.first_name,
        last_name: body.last_name,
        phone_number: body.phone_number,
    };

    match services.users.update_profile(ctx.user_id(), update) {
        Ok(user) => Json(UserResponse::from(user)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Change password: re-verify the current one, then revoke the presented
/// credential. No new token is issued; the caller logs in again.
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Extension(bearer): Extension<BearerToken>,
    Json(body): Json<ChangePasswordRequest>,
) -> axum::response::Response {
    if body.new_password.len() < 8 {
        let mut fields = HashMap::new();
        fields.insert(
            "new_password".to_string(),
            "must be at least 8 characters".to_string(),
        );
        return errors::validation_errors(fields);
    }

    match services
        .users
        .change_password(ctx.user_id(), &body.current_password, &body.new_password)
    {
        Ok(()) => {
            services.revocations.revoke(bearer.token, bearer.expires_at);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
