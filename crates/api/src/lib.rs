//! `corebank-api` — HTTP surface over the ledger (axum).

pub mod app;
pub mod context;
pub mod middleware;
