use axum::Router;

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod system;
pub mod transfers;
pub mod users;

/// Routes reachable without a credential.
pub fn public_router() -> Router {
    Router::new().merge(auth::public_router())
}

/// Routes behind the bearer-auth middleware.
pub fn protected_router() -> Router {
    Router::new()
        .merge(auth::protected_router())
        .merge(users::router())
        .merge(accounts::router())
        .merge(transfers::router())
        .nest("/admin", admin::router())
}
