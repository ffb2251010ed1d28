//! Moderation service layer - blacklist and servicer verification

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::PaginationParams;
use crate::moderation::{
    BlacklistEntry, SuspendRequest, Verification, VerificationStatus,
};

/// Moderation service
pub struct ModerationService {
    db_pool: PgPool,
}

impl ModerationService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Active blacklist entries, newest first
    pub async fn list_blacklist(
        &self,
        pagination: &PaginationParams,
    ) -> ApiResult<Vec<BlacklistEntry>> {
        let (_, limit, offset) = pagination.normalize();

        let entries = sqlx::query_as::<_, BlacklistEntry>(
            r#"
            SELECT * FROM blacklist_entries
            WHERE lifted_at IS NULL
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(entries)
    }

    /// Suspend a user: create a blacklist entry, flag the account, and
    /// revoke its live sessions - atomically.
    pub async fn suspend_user(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        request: SuspendRequest,
    ) -> ApiResult<BlacklistEntry> {
        request
            .check_ban_until()
            .map_err(ApiError::ValidationError)?;

        if admin_id == user_id {
            return Err(ApiError::BadRequest(
                "Admins cannot suspend themselves".to_string(),
            ));
        }

        let already_banned: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM blacklist_entries WHERE user_id = $1 AND lifted_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?;

        if already_banned.is_some() {
            return Err(ApiError::Conflict("User is already suspended".to_string()));
        }

        let mut tx = self.db_pool.begin().await?;
        let now = Utc::now();

        let flagged = sqlx::query(
            "UPDATE users SET suspended = TRUE, updated_at = $1 WHERE id = $2",
        )
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if flagged.rows_affected() == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let entry = sqlx::query_as::<_, BlacklistEntry>(
            r#"
            INSERT INTO blacklist_entries (id, user_id, ban_type, ban_until, reason, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(request.ban_type)
        .bind(request.ban_until)
        .bind(&request.reason)
        .bind(admin_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        // A suspended account must not keep using issued tokens
        sqlx::query(
            "UPDATE auth_sessions SET revoked_at = $1 WHERE user_id = $2 AND revoked_at IS NULL",
        )
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::warn!(
            user_id = %user_id,
            ban_type = ?entry.ban_type,
            admin_id = %admin_id,
            "User suspended"
        );

        Ok(entry)
    }

    /// Lift a user's active suspension
    pub async fn unsuspend_user(&self, admin_id: Uuid, user_id: Uuid) -> ApiResult<BlacklistEntry> {
        let mut tx = self.db_pool.begin().await?;
        let now = Utc::now();

        let entry = sqlx::query_as::<_, BlacklistEntry>(
            r#"
            UPDATE blacklist_entries
            SET lifted_at = $1, lifted_by = $2
            WHERE user_id = $3 AND lifted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(admin_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("No active suspension for this user".to_string()))?;

        sqlx::query("UPDATE users SET suspended = FALSE, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, admin_id = %admin_id, "Suspension lifted");

        Ok(entry)
    }

    /// Verifications awaiting review
    pub async fn list_verifications(
        &self,
        status: Option<VerificationStatus>,
        pagination: &PaginationParams,
    ) -> ApiResult<Vec<Verification>> {
        let (_, limit, offset) = pagination.normalize();

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM verifications WHERE 1=1");

        if let Some(status) = status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }

        query_builder.push(" ORDER BY created_at ASC LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset);

        let verifications = query_builder
            .build_query_as::<Verification>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(verifications)
    }

    /// Approve a pending verification
    pub async fn approve_verification(
        &self,
        admin_id: Uuid,
        verification_id: Uuid,
        notes: Option<String>,
    ) -> ApiResult<Verification> {
        self.review_verification(admin_id, verification_id, VerificationStatus::Approved, notes)
            .await
    }

    /// Reject a pending verification
    pub async fn reject_verification(
        &self,
        admin_id: Uuid,
        verification_id: Uuid,
        notes: Option<String>,
    ) -> ApiResult<Verification> {
        self.review_verification(admin_id, verification_id, VerificationStatus::Rejected, notes)
            .await
    }

    /// One-shot pending -> approved|rejected flip
    async fn review_verification(
        &self,
        admin_id: Uuid,
        verification_id: Uuid,
        verdict: VerificationStatus,
        notes: Option<String>,
    ) -> ApiResult<Verification> {
        let updated = sqlx::query_as::<_, Verification>(
            r#"
            UPDATE verifications
            SET status = $1, notes = $2, reviewed_by = $3, reviewed_at = $4
            WHERE id = $5 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(verdict)
        .bind(notes)
        .bind(admin_id)
        .bind(Utc::now())
        .bind(verification_id)
        .fetch_optional(&self.db_pool)
        .await?;

        match updated {
            Some(verification) => {
                tracing::info!(
                    verification_id = %verification_id,
                    verdict = ?verdict,
                    "Verification reviewed"
                );
                Ok(verification)
            }
            None => {
                let exists: Option<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM verifications WHERE id = $1")
                        .bind(verification_id)
                        .fetch_optional(&self.db_pool)
                        .await?;

                if exists.is_some() {
                    Err(ApiError::Conflict(
                        "Verification has already been reviewed".to_string(),
                    ))
                } else {
                    Err(ApiError::NotFound("Verification not found".to_string()))
                }
            }
        }
    }
}
