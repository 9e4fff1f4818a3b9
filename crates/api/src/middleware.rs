use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use corebank_auth::{RevocationSet, TokenValidator};

use crate::context::{AuthContext, BearerToken};

#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn TokenValidator>,
    pub revocations: Arc<RevocationSet>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    // revoked credentials die here, before signature checking even runs
    if state.revocations.is_revoked(token) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let claims = state
        .validator
        .validate(token)
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    let bearer = BearerToken {
        token: token.to_string(),
        expires_at: claims.expires_at(),
    };
    req.extensions_mut()
        .insert(AuthContext::new(claims.uid, claims.sub, claims.role));
    req.extensions_mut().insert(bearer);

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
