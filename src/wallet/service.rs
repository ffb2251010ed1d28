//! Wallet service layer - balances and the transaction ledger

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::PaginationParams;
use crate::wallet::{Wallet, WalletTransaction, WalletTxKind};

/// Wallet service
#[derive(Clone)]
pub struct WalletService {
    db_pool: PgPool,
}

impl WalletService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Get a user's wallet
    pub async fn get_wallet(&self, user_id: Uuid) -> ApiResult<Wallet> {
        let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Wallet not found".to_string()))?;

        Ok(wallet)
    }

    /// List a user's ledger entries, newest first
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        pagination: &PaginationParams,
    ) -> ApiResult<Vec<WalletTransaction>> {
        let (_, limit, offset) = pagination.normalize();

        let transactions = sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT * FROM wallet_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(transactions)
    }

    /// Credit a wallet inside a caller-owned transaction
    ///
    /// Used by refund processing so that the balance update, the ledger row,
    /// and the refund state change commit or roll back together.
    pub async fn credit_in_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        amount: i64,
        kind: WalletTxKind,
        reference_id: Option<Uuid>,
        description: &str,
    ) -> ApiResult<WalletTransaction> {
        if amount <= 0 {
            return Err(ApiError::BadRequest(
                "Credit amount must be positive".to_string(),
            ));
        }

        let updated = sqlx::query(
            "UPDATE wallets SET balance = balance + $1, updated_at = $2 WHERE user_id = $3",
        )
        .bind(amount)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::NotFound("Wallet not found".to_string()));
        }

        let tx_row = sqlx::query_as::<_, WalletTransaction>(
            r#"
            INSERT INTO wallet_transactions (id, user_id, amount, kind, reference_id, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(amount)
        .bind(kind)
        .bind(reference_id)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(tx_row)
    }
}
