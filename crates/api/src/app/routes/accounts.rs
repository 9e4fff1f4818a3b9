//! Account lifecycle and deposits.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use corebank_core::has_valid_scale;
use rust_decimal::Decimal;

use crate::app::dto::{self, AccountResponse, DepositRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/accounts", post(open_account).get(list_owned))
        .route("/accounts/:number", get(view_account))
        .route("/accounts/:number/deposit", post(deposit))
}

pub async fn open_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.engine.open_account(ctx.user_id()) {
        Ok(account) => {
            tracing::info!("account opened: {}", account.number);
            (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_owned(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.accounts.list_by_owner(ctx.user_id()) {
        Ok(accounts) => Json(
            accounts
                .into_iter()
                .map(AccountResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn view_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number = match errors::parse_account_number(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    match services.engine.account_for_owner(ctx.user_id(), &number) {
        Ok(account) => Json(AccountResponse::from(account)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(number): Path<String>,
    Json(body): Json<DepositRequest>,
) -> axum::response::Response {
    let number = match errors::parse_account_number(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    if let Some((field, message)) = amount_field_error(&body.amount) {
        return errors::validation_errors(HashMap::from([(field, message)]));
    }

    // deposits are owner-initiated; ownership gates the mutation
    if let Err(e) = services.engine.account_for_owner(ctx.user_id(), &number) {
        return errors::domain_error_to_response(e);
    }

    match services.engine.deposit(
        &number,
        body.amount,
        body.description.unwrap_or_default(),
    ) {
        Ok(row) => Json(dto::transaction_to_response(&services.accounts, &row)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Shared amount validation: positive, at most two decimal places.
pub(crate) fn amount_field_error(amount: &Decimal) -> Option<(String, String)> {
    if *amount <= Decimal::ZERO {
        Some(("amount".to_string(), "must be positive".to_string()))
    } else if !has_valid_scale(amount) {
        Some((
            "amount".to_string(),
            "must have at most two decimal places".to_string(),
        ))
    } else {
        None
    }
}
