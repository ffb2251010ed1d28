//! Refund service layer - the servicer refund deadline state machine
//!
//! Entries move `pending -> overdue` purely by the clock (materialized by
//! the sweeper), `-> completed` when the servicer or an admin credits the
//! customer wallet, and `overdue -> escalated` when either party reports
//! the delay. Completion, the wallet credit, and the booking payment flip
//! commit in a single transaction.

use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::booking::Booking;
use crate::error::{ApiError, ApiResult};
use crate::models::PaginationParams;
use crate::refund::{RefundEntry, RefundStatus};
use crate::wallet::{WalletService, WalletTxKind};

/// Refund service
pub struct RefundService {
    db_pool: PgPool,
}

impl RefundService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Insert the refund entry for a cancelled booking, inside the
    /// cancellation transaction
    pub async fn create_entry_in_tx(
        conn: &mut PgConnection,
        booking: &Booking,
        percentage: i16,
        amount: i64,
        cancelled_at: chrono::DateTime<Utc>,
        deadline_hours: i64,
    ) -> ApiResult<RefundEntry> {
        let entry = sqlx::query_as::<_, RefundEntry>(
            r#"
            INSERT INTO refund_entries (
                id, booking_id, booking_number, customer_id, servicer_id,
                refund_amount, refund_percentage, cancelled_at, deadline_at,
                status, issue_reported, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', FALSE, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking.id)
        .bind(&booking.booking_number)
        .bind(booking.customer_id)
        .bind(booking.servicer_id)
        .bind(amount)
        .bind(percentage)
        .bind(cancelled_at)
        .bind(cancelled_at + Duration::hours(deadline_hours))
        .fetch_one(conn)
        .await?;

        tracing::info!(
            refund_id = %entry.id,
            booking_number = %entry.booking_number,
            amount = entry.refund_amount,
            "Refund entry created"
        );

        Ok(entry)
    }

    /// All refund entries assigned to a servicer, newest first
    pub async fn servicer_queue(&self, servicer_id: Uuid) -> ApiResult<Vec<RefundEntry>> {
        let entries = sqlx::query_as::<_, RefundEntry>(
            "SELECT * FROM refund_entries WHERE servicer_id = $1 ORDER BY cancelled_at DESC",
        )
        .bind(servicer_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(entries)
    }

    /// Look up the refund entry for a booking
    pub async fn get_by_booking(&self, booking_id: Uuid) -> ApiResult<RefundEntry> {
        let entry = sqlx::query_as::<_, RefundEntry>(
            "SELECT * FROM refund_entries WHERE booking_id = $1",
        )
        .bind(booking_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("No refund owed for this booking".to_string()))?;

        Ok(entry)
    }

    /// Servicer processes a refund: credits the customer wallet, marks the
    /// entry completed, and flips the booking to refunded - atomically.
    pub async fn process_refund(
        &self,
        servicer_id: Uuid,
        booking_id: Uuid,
    ) -> ApiResult<RefundEntry> {
        let entry = self.get_by_booking(booking_id).await?;

        if entry.servicer_id != servicer_id {
            return Err(ApiError::NotFound(
                "No refund owed for this booking".to_string(),
            ));
        }

        self.complete_entry(entry, servicer_id).await
    }

    /// Customer or servicer reports a missed refund deadline, escalating the
    /// entry to admins
    pub async fn report_delay(&self, reporter_id: Uuid, booking_id: Uuid) -> ApiResult<RefundEntry> {
        let entry = self.get_by_booking(booking_id).await?;

        if entry.customer_id != reporter_id && entry.servicer_id != reporter_id {
            return Err(ApiError::NotFound(
                "No refund owed for this booking".to_string(),
            ));
        }

        let now = Utc::now();
        match entry.effective_status(now) {
            RefundStatus::Overdue => {}
            RefundStatus::Pending => {
                return Err(ApiError::BadRequest(
                    "Refund is still within the processing window".to_string(),
                ))
            }
            RefundStatus::Escalated => {
                return Err(ApiError::Conflict(
                    "Refund delay has already been reported".to_string(),
                ))
            }
            RefundStatus::Completed => {
                return Err(ApiError::Conflict(
                    "Refund has already been processed".to_string(),
                ))
            }
        }

        // The deadline guard repeats the clock predicate so a racing process
        // cannot escalate an entry that was just completed
        let updated = sqlx::query_as::<_, RefundEntry>(
            r#"
            UPDATE refund_entries
            SET status = 'escalated', issue_reported = TRUE, reported_by = $1, updated_at = $2
            WHERE id = $3 AND status IN ('pending', 'overdue') AND deadline_at < $2
            RETURNING *
            "#,
        )
        .bind(reporter_id)
        .bind(now)
        .bind(entry.id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::Conflict("Refund state changed concurrently".to_string()))?;

        tracing::warn!(
            refund_id = %updated.id,
            booking_number = %updated.booking_number,
            reported_by = %reporter_id,
            "Refund delay escalated to admins"
        );

        Ok(updated)
    }

    /// Escalated refunds awaiting admin action
    pub async fn list_escalated(
        &self,
        pagination: &PaginationParams,
    ) -> ApiResult<Vec<RefundEntry>> {
        let (_, limit, offset) = pagination.normalize();

        let entries = sqlx::query_as::<_, RefundEntry>(
            r#"
            SELECT * FROM refund_entries
            WHERE status = 'escalated'
            ORDER BY deadline_at ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(entries)
    }

    /// Admin processes an escalated refund directly and records a penalty
    /// against the servicer that missed the window
    pub async fn admin_process_refund(
        &self,
        admin_id: Uuid,
        refund_id: Uuid,
    ) -> ApiResult<RefundEntry> {
        let entry = sqlx::query_as::<_, RefundEntry>(
            "SELECT * FROM refund_entries WHERE id = $1",
        )
        .bind(refund_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Refund entry not found".to_string()))?;

        if entry.status != RefundStatus::Escalated {
            return Err(ApiError::Conflict(
                "Only escalated refunds can be processed by admins".to_string(),
            ));
        }

        let mut tx = self.db_pool.begin().await?;
        let now = Utc::now();

        let updated = sqlx::query_as::<_, RefundEntry>(
            r#"
            UPDATE refund_entries
            SET status = 'completed', processed_by = $1, processed_at = $2, updated_at = $2
            WHERE id = $3 AND status = 'escalated'
            RETURNING *
            "#,
        )
        .bind(admin_id)
        .bind(now)
        .bind(refund_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::Conflict("Refund state changed concurrently".to_string()))?;

        Self::settle_in_tx(&mut tx, &updated).await?;

        sqlx::query(
            r#"
            INSERT INTO servicer_penalties (id, servicer_id, refund_id, reason, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(updated.servicer_id)
        .bind(updated.id)
        .bind("Missed 48-hour refund processing window; resolved by admin")
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::warn!(
            refund_id = %updated.id,
            servicer_id = %updated.servicer_id,
            admin_id = %admin_id,
            "Escalated refund processed by admin, servicer penalized"
        );

        Ok(updated)
    }

    /// Flip pending entries past their deadline to overdue. Called by the
    /// background sweeper; returns the flipped entries for logging.
    pub async fn sweep_overdue(&self) -> ApiResult<Vec<(Uuid, String)>> {
        let flipped = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            UPDATE refund_entries
            SET status = 'overdue', updated_at = $1
            WHERE status = 'pending' AND deadline_at < $1
            RETURNING id, booking_number
            "#,
        )
        .bind(Utc::now())
        .fetch_all(&self.db_pool)
        .await?;

        Ok(flipped)
    }

    async fn complete_entry(
        &self,
        entry: RefundEntry,
        processor_id: Uuid,
    ) -> ApiResult<RefundEntry> {
        match entry.status {
            RefundStatus::Pending | RefundStatus::Overdue => {}
            RefundStatus::Escalated => {
                return Err(ApiError::Conflict(
                    "Refund has been escalated; an admin will process it".to_string(),
                ))
            }
            RefundStatus::Completed => {
                return Err(ApiError::Conflict(
                    "Refund has already been processed".to_string(),
                ))
            }
        }

        let mut tx = self.db_pool.begin().await?;
        let now = Utc::now();

        let updated = sqlx::query_as::<_, RefundEntry>(
            r#"
            UPDATE refund_entries
            SET status = 'completed', processed_by = $1, processed_at = $2, updated_at = $2
            WHERE id = $3 AND status IN ('pending', 'overdue')
            RETURNING *
            "#,
        )
        .bind(processor_id)
        .bind(now)
        .bind(entry.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::Conflict("Refund state changed concurrently".to_string()))?;

        Self::settle_in_tx(&mut tx, &updated).await?;

        tx.commit().await?;

        tracing::info!(
            refund_id = %updated.id,
            booking_number = %updated.booking_number,
            amount = updated.refund_amount,
            "Refund processed and wallet credited"
        );

        Ok(updated)
    }

    /// Credit the customer wallet and flip the booking to refunded, inside
    /// the completion transaction
    async fn settle_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &RefundEntry,
    ) -> ApiResult<()> {
        WalletService::credit_in_tx(
            &mut **tx,
            entry.customer_id,
            entry.refund_amount,
            WalletTxKind::RefundCredit,
            Some(entry.id),
            &format!("Refund for booking {}", entry.booking_number),
        )
        .await?;

        sqlx::query(
            "UPDATE bookings SET payment_status = 'refunded', updated_at = $1 WHERE id = $2",
        )
        .bind(Utc::now())
        .bind(entry.booking_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
