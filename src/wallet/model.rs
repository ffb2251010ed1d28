//! Wallet models for the Servika backend

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

/// Wallet model, one per user
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Wallet {
    pub user_id: Uuid,
    /// Balance in minor currency units
    pub balance: i64,
    pub updated_at: DateTime<Utc>,
}

/// Ledger entry kinds
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "wallet_tx_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WalletTxKind {
    RefundCredit,
    Adjustment,
}

/// Append-only wallet ledger entry
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub kind: WalletTxKind,
    /// Refund entry ID for refund credits
    pub reference_id: Option<Uuid>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
