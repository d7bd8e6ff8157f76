use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::requests::{
    AccountsQuery, BonusRequest, HistoryQuery, LoginRequest, RegisterRequest, SpendRequest,
    TopUpRequest,
};
use crate::api::responses::{
    AccountOut, AssetTypeOut, BalanceResponse, HealthResponse, RootResponse, TokenResponse,
    TransactionListResponse, TransactionOut,
};
use crate::auth::{AuthService, TokenIssuer};
use crate::services::WalletQueries;

use super::routes::AppState;

/// Liveness probe.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.settings.app_name.clone(),
        version: state.settings.app_version.clone(),
    })
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        service: state.settings.app_name.clone(),
        version: state.settings.app_version.clone(),
        health: "/health".to_string(),
    })
}

// ============================================================================
// Wallet reads
// ============================================================================

pub async fn get_balance(
    State(state): State<AppState>,
    Path((account_id, asset_type_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let queries = WalletQueries::new(state.pool.clone());
    let summary = queries.get_balance(account_id, asset_type_id).await?;
    Ok(Json(BalanceResponse::from(summary)))
}

pub async fn get_transactions(
    State(state): State<AppState>,
    Path((account_id, asset_type_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let (limit, offset) = query.validate()?;

    let queries = WalletQueries::new(state.pool.clone());
    let page = queries
        .get_transaction_history(account_id, asset_type_id, limit, offset)
        .await?;

    Ok(Json(TransactionListResponse {
        account_id,
        asset_type: page.asset_type.name,
        transactions: page
            .transactions
            .into_iter()
            .map(TransactionOut::from)
            .collect(),
        total: page.total,
    }))
}

pub async fn list_asset_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<AssetTypeOut>>, ApiError> {
    let queries = WalletQueries::new(state.pool.clone());
    let assets = queries.list_asset_types().await?;
    Ok(Json(assets.into_iter().map(AssetTypeOut::from).collect()))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<AccountsQuery>,
) -> Result<Json<Vec<AccountOut>>, ApiError> {
    let queries = WalletQueries::new(state.pool.clone());
    let accounts = queries
        .list_accounts(query.include_system.unwrap_or(false))
        .await?;
    Ok(Json(accounts.into_iter().map(AccountOut::from).collect()))
}

// ============================================================================
// Wallet mutations
// ============================================================================

pub async fn top_up(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TopUpRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    request.validate()?;

    let engine = state.engine();
    let outcome = engine
        .top_up(
            request.user_account_id,
            request.asset_type_id,
            request.amount,
            request.payment_reference,
            request.description,
            idempotency_key(&headers),
        )
        .await?;

    Ok((movement_status(outcome.replayed), Json(outcome.body)))
}

pub async fn issue_bonus(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BonusRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    request.validate()?;

    let engine = state.engine();
    let outcome = engine
        .issue_bonus(
            request.user_account_id,
            request.asset_type_id,
            request.amount,
            request.reason,
            request.description,
            idempotency_key(&headers),
        )
        .await?;

    Ok((movement_status(outcome.replayed), Json(outcome.body)))
}

pub async fn spend(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SpendRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    request.validate()?;

    let engine = state.engine();
    let outcome = engine
        .spend(
            request.user_account_id,
            request.asset_type_id,
            request.amount,
            request.item_reference,
            request.description,
            idempotency_key(&headers),
        )
        .await?;

    Ok((movement_status(outcome.replayed), Json(outcome.body)))
}

/// A replayed idempotent request answers 200; a fresh movement answers 201.
fn movement_status(replayed: bool) -> StatusCode {
    if replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    }
}

fn idempotency_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Idempotency-Key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

// ============================================================================
// Auth
// ============================================================================

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    request.validate()?;

    let auth = auth_service(&state)?;
    let issued = auth
        .register(request.username, request.email, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::bearer(
            issued.access_token,
            issued.account.id,
            issued.account.username,
        )),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let auth = auth_service(&state)?;
    let issued = auth.login(&request.username, &request.password).await?;

    Ok(Json(TokenResponse::bearer(
        issued.access_token,
        issued.account.id,
        issued.account.username,
    )))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let auth = auth_service(&state)?;
    auth.delete_account(account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn auth_service(state: &AppState) -> Result<AuthService, ApiError> {
    let issuer = TokenIssuer::from_settings(&state.settings)?;
    Ok(AuthService::new(state.pool.clone(), issuer))
}
