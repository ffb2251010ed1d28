//! Wallet API handlers

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::models::PaginationParams;
use crate::state::AppState;
use crate::wallet::{Wallet, WalletTransaction};

/// Get the caller's wallet balance
pub async fn get_wallet(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Wallet>> {
    let wallet = app_state.wallet_service.get_wallet(user.user_id).await?;
    Ok(Json(wallet))
}

/// List the caller's ledger entries, newest first
pub async fn list_wallet_transactions(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<Vec<WalletTransaction>>> {
    let transactions = app_state
        .wallet_service
        .list_transactions(user.user_id, &pagination)
        .await?;

    Ok(Json(transactions))
}
