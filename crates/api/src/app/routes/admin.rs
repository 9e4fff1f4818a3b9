//! Admin-only reporting surface.
//!
//! Every handler checks the ADMIN role itself; a USER credential gets 403
//! without touching any store.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
};
use chrono::{Duration, Utc};

use corebank_core::DomainResult;
use corebank_ledger::stats;

use crate::app::dto::{self, DailyStatsParams, SystemStatsResponse, UserResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/stats", get(system_stats))
        .route("/stats/daily", get(daily_stats))
        .route("/stats/monthly", get(monthly_stats))
        .route("/users", get(list_users))
        .route("/accounts", get(list_accounts))
        .route("/transactions", get(list_transactions))
}

fn require_admin(ctx: &AuthContext) -> Result<(), axum::response::Response> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(errors::forbidden())
    }
}

pub async fn system_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&ctx) {
        return resp;
    }

    let stats = (|| -> DomainResult<SystemStatsResponse> {
        Ok(SystemStatsResponse {
            user_count: services.users.count()? as u64,
            account_count: services.accounts.count()? as u64,
            transaction_count: services.log.count()? as u64,
            total_amount: services.log.total_amount()?,
        })
    })();

    match stats {
        Ok(body) => Json(body).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn daily_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Query(params): Query<DailyStatsParams>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&ctx) {
        return resp;
    }

    let days = params.days.unwrap_or(30).max(0);
    let since = Utc::now() - Duration::days(days);
    match stats::daily_volume(&services.log, since) {
        Ok(buckets) => Json(buckets).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn monthly_stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&ctx) {
        return resp;
    }

    // fixed 12-month lookback, matching the dashboard
    let since = Utc::now() - Duration::days(365);
    match stats::monthly_volume(&services.log, since) {
        Ok(buckets) => Json(buckets).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&ctx) {
        return resp;
    }

    match services.users.list_all() {
        Ok(users) => Json(
            users
                .into_iter()
                .map(UserResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&ctx) {
        return resp;
    }

    match services.accounts.list_all() {
        Ok(accounts) => Json(
            accounts
                .into_iter()
                .map(dto::AccountResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Full transaction listing, each row annotated by the fraud scorer.
/// Scorer trouble degrades to the neutral verdict; the listing always loads.
pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(resp) = require_admin(&ctx) {
        return resp;
    }

    let rows = match services.log.list_all() {
        Ok(rows) => rows,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let summary = dto::transaction_summary(row);
        let verdict = corebank_fraud::score_or_default(services.fraud.as_ref(), &summary).await;
        out.push(dto::admin_transaction_to_response(
            &services.accounts,
            row,
            verdict,
        ));
    }

    Json(out).into_response()
}
