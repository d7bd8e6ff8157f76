use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::Settings;
use crate::services::WalletEngine;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(pool: PgPool, settings: Settings) -> Self {
        Self {
            pool,
            settings: Arc::new(settings),
        }
    }

    pub fn engine(&self) -> WalletEngine {
        WalletEngine::new(self.pool.clone(), self.settings.idempotency_key_ttl_hours)
    }
}

/// Creates the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // System endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Wallet reads
        .route(
            "/wallet/balance/:account_id/:asset_type_id",
            get(handlers::get_balance),
        )
        .route(
            "/wallet/transactions/:account_id/:asset_type_id",
            get(handlers::get_transactions),
        )
        .route("/wallet/asset-types", get(handlers::list_asset_types))
        .route("/wallet/accounts", get(handlers::list_accounts))
        // Wallet mutations
        .route("/wallet/topup", post(handlers::top_up))
        .route("/wallet/bonus", post(handlers::issue_bonus))
        .route("/wallet/spend", post(handlers::spend))
        // Auth
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/accounts/:account_id", delete(handlers::delete_account))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
