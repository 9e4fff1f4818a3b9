//! Transfers and transaction history.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, post},
};

use corebank_core::AccountNumber;
use corebank_ledger::HistoryScope;

use crate::app::dto::{self, TransferRequest};
use crate::app::errors;
use crate::app::routes::accounts::amount_field_error;
use crate::app::services::AppServices;
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/transfers", post(transfer))
        .route("/transfers/account/:number", get(history_all))
        .route("/transfers/account/:number/deposits", get(history_deposits))
        .route("/transfers/account/:number/sent", get(history_sent))
        .route("/transfers/account/:number/received", get(history_received))
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<TransferRequest>,
) -> axum::response::Response {
    // collect every field problem before answering
    let mut fields = HashMap::new();
    if let Some((field, message)) = amount_field_error(&body.amount) {
        fields.insert(field, message);
    }
    let sender = body.sender_account_number.parse::<AccountNumber>();
    if sender.is_err() {
        fields.insert(
            "sender_account_number".to_string(),
            "must be a valid account number".to_string(),
        );
    }
    let receiver = body.receiver_account_number.parse::<AccountNumber>();
    if receiver.is_err() {
        fields.insert(
            "receiver_account_number".to_string(),
            "must be a valid account number".to_string(),
        );
    }
    let (Ok(sender), Ok(receiver), true) = (sender, receiver, fields.is_empty()) else {
        return errors::validation_errors(fields);
    };

    // sender ownership is the authorization gate; the receiver may be any
    // valid account
    if let Err(e) = services.engine.account_for_owner(ctx.user_id(), &sender) {
        return errors::domain_error_to_response(e);
    }

    match services.engine.transfer(
        &sender,
        &receiver,
        body.amount,
        body.description.unwrap_or_default(),
    ) {
        Ok(row) => {
            tracing::info!(amount = %row.amount, "transfer committed: {}", row.id);
            Json(dto::transaction_to_response(&services.accounts, &row)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn history_all(
    services: Extension<Arc<AppServices>>,
    ctx: Extension<AuthContext>,
    number: Path<String>,
) -> axum::response::Response {
    history(services, ctx, number, HistoryScope::All).await
}

pub async fn history_deposits(
    services: Extension<Arc<AppServices>>,
    ctx: Extension<AuthContext>,
    number: Path<String>,
) -> axum::response::Response {
    history(services, ctx, number, HistoryScope::DepositsOnly).await
}

pub async fn history_sent(
    services: Extension<Arc<AppServices>>,
    ctx: Extension<AuthContext>,
    number: Path<String>,
) -> axum::response::Response {
    history(services, ctx, number, HistoryScope::Sent).await
}

pub async fn history_received(
    services: Extension<Arc<AppServices>>,
    ctx: Extension<AuthContext>,
    number: Path<String>,
) -> axum::response::Response {
    history(services, ctx, number, HistoryScope::Received).await
}

async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(number): Path<String>,
    scope: HistoryScope,
) -> axum::response::Response {
    let number = match errors::parse_account_number(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    match services.engine.history(ctx.user_id(), &number, scope) {
        Ok(rows) => Json(
            rows.iter()
                .map(|t| dto::transaction_to_response(&services.accounts, t))
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
