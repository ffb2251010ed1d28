//! Booking service layer - Business logic for the booking lifecycle

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::booking::{
    generate_booking_number, Booking, BookingStatus, CancelBookingResponse, CreateBookingRequest,
    ListBookingsQuery, PaymentStatus,
};
use crate::error::{ApiError, ApiResult};
use crate::models::{PaginationParams, UserRole};
use crate::refund::{self, RefundEligibilityResponse, RefundService};

/// Booking service for managing the booking lifecycle
pub struct BookingService {
    db_pool: PgPool,
    refund_deadline_hours: i64,
}

impl BookingService {
    pub fn new(db_pool: PgPool, refund_deadline_hours: i64) -> Self {
        Self {
            db_pool,
            refund_deadline_hours,
        }
    }

    /// Create a booking against a servicer
    pub async fn create_booking(
        &self,
        customer_id: Uuid,
        request: CreateBookingRequest,
    ) -> ApiResult<Booking> {
        if request.service_start_at <= Utc::now() {
            return Err(ApiError::BadRequest(
                "Service start time must be in the future".to_string(),
            ));
        }

        let servicer: Option<(UserRole, bool)> =
            sqlx::query_as("SELECT role, suspended FROM users WHERE id = $1")
                .bind(request.servicer_id)
                .fetch_optional(&self.db_pool)
                .await?;

        match servicer {
            Some((UserRole::Servicer, false)) => {}
            Some((UserRole::Servicer, true)) => {
                return Err(ApiError::Conflict("Servicer is suspended".to_string()))
            }
            Some(_) => {
                return Err(ApiError::BadRequest(
                    "Target user is not a servicer".to_string(),
                ))
            }
            None => return Err(ApiError::NotFound("Servicer not found".to_string())),
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, booking_number, customer_id, servicer_id, service_description,
                service_start_at, total_amount, status, payment_status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', 'paid', $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(generate_booking_number())
        .bind(customer_id)
        .bind(request.servicer_id)
        .bind(&request.service_description)
        .bind(request.service_start_at)
        .bind(request.total_amount)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(
            booking_id = %booking.id,
            booking_number = %booking.booking_number,
            "Booking created"
        );

        Ok(booking)
    }

    /// Get a booking, checking that `viewer_id` (when given) is a party to it
    pub async fn get_booking(&self, id: Uuid, viewer_id: Option<Uuid>) -> ApiResult<Booking> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

        if let Some(viewer) = viewer_id {
            if booking.customer_id != viewer && booking.servicer_id != viewer {
                return Err(ApiError::NotFound("Booking not found".to_string()));
            }
        }

        Ok(booking)
    }

    /// List bookings for one side of the marketplace
    pub async fn list_bookings(
        &self,
        customer_id: Option<Uuid>,
        servicer_id: Option<Uuid>,
        query: &ListBookingsQuery,
    ) -> ApiResult<Vec<Booking>> {
        let (_, limit, offset) = PaginationParams {
            page: query.page,
            limit: query.limit,
        }
        .normalize();

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM bookings WHERE 1=1");

        if let Some(status) = query.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }
        if let Some(customer_id) = customer_id {
            query_builder.push(" AND customer_id = ");
            query_builder.push_bind(customer_id);
        }
        if let Some(servicer_id) = servicer_id {
            query_builder.push(" AND servicer_id = ");
            query_builder.push_bind(servicer_id);
        }

        query_builder.push(" ORDER BY created_at DESC LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset);

        let bookings = query_builder
            .build_query_as::<Booking>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(bookings)
    }

    /// Servicer accepts a pending booking
    pub async fn accept_booking(&self, servicer_id: Uuid, booking_id: Uuid) -> ApiResult<Booking> {
        self.servicer_transition(
            servicer_id,
            booking_id,
            BookingStatus::Accepted,
            "accepted_at",
        )
        .await
    }

    /// Servicer starts work on an accepted booking
    pub async fn start_booking(&self, servicer_id: Uuid, booking_id: Uuid) -> ApiResult<Booking> {
        self.servicer_transition(
            servicer_id,
            booking_id,
            BookingStatus::InProgress,
            "started_at",
        )
        .await
    }

    /// Servicer completes an in-progress booking
    pub async fn complete_booking(
        &self,
        servicer_id: Uuid,
        booking_id: Uuid,
    ) -> ApiResult<Booking> {
        self.servicer_transition(
            servicer_id,
            booking_id,
            BookingStatus::Completed,
            "completed_at",
        )
        .await
    }

    /// Preview the refund a cancellation would yield right now
    pub async fn refund_eligibility(
        &self,
        customer_id: Uuid,
        booking_id: Uuid,
    ) -> ApiResult<RefundEligibilityResponse> {
        let booking = self.get_booking(booking_id, Some(customer_id)).await?;

        let cancellable = booking.status.can_transition_to(BookingStatus::Cancelled);
        let lead = booking.service_start_at - Utc::now();
        let percentage = refund::refund_percentage(lead);

        Ok(RefundEligibilityResponse {
            booking_id: booking.id,
            booking_number: booking.booking_number,
            cancellable,
            refund_percentage: percentage,
            refund_amount: refund::refund_amount(booking.total_amount, percentage),
            hours_until_service: lead.num_hours(),
        })
    }

    /// Cancel a booking and, when the refund tier is non-zero, create the
    /// refund entry owed by the servicer. Both writes commit atomically.
    pub async fn cancel_booking(
        &self,
        customer_id: Uuid,
        booking_id: Uuid,
    ) -> ApiResult<CancelBookingResponse> {
        let booking = self.get_booking(booking_id, Some(customer_id)).await?;

        if booking.customer_id != customer_id {
            return Err(ApiError::NotFound("Booking not found".to_string()));
        }

        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(ApiError::Conflict(format!(
                "Booking in status {:?} cannot be cancelled",
                booking.status
            )));
        }

        let now = Utc::now();
        let lead = booking.service_start_at - now;
        let percentage = refund::refund_percentage(lead);
        let amount = refund::refund_amount(booking.total_amount, percentage);

        let payment_status = if percentage > 0 {
            PaymentStatus::RefundPending
        } else {
            booking.payment_status
        };

        let mut tx = self.db_pool.begin().await?;

        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'cancelled', payment_status = $1, cancelled_at = $2, updated_at = $2
            WHERE id = $3 AND status IN ('pending', 'accepted')
            RETURNING *
            "#,
        )
        .bind(payment_status)
        .bind(now)
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("Booking status changed while cancelling".to_string())
        })?;

        let refund = if percentage > 0 {
            let entry = RefundService::create_entry_in_tx(
                &mut *tx,
                &updated,
                percentage,
                amount,
                now,
                self.refund_deadline_hours,
            )
            .await?;
            Some(entry.to_response(now))
        } else {
            None
        };

        tx.commit().await?;

        tracing::info!(
            booking_id = %booking_id,
            refund_percentage = percentage,
            refund_amount = amount,
            "Booking cancelled"
        );

        Ok(CancelBookingResponse {
            booking: updated,
            refund,
        })
    }

    async fn servicer_transition(
        &self,
        servicer_id: Uuid,
        booking_id: Uuid,
        next: BookingStatus,
        timestamp_column: &'static str,
    ) -> ApiResult<Booking> {
        let booking = self.get_booking(booking_id, None).await?;

        if booking.servicer_id != servicer_id {
            return Err(ApiError::NotFound("Booking not found".to_string()));
        }

        if !booking.status.can_transition_to(next) {
            return Err(ApiError::Conflict(format!(
                "Booking in status {:?} cannot move to {:?}",
                booking.status, next
            )));
        }

        // Status guard in the WHERE clause keeps concurrent submissions from
        // double-applying the transition
        let sql = format!(
            "UPDATE bookings SET status = $1, {} = $2, updated_at = $2 \
             WHERE id = $3 AND servicer_id = $4 AND status = $5 RETURNING *",
            timestamp_column
        );

        let updated = sqlx::query_as::<_, Booking>(&sql)
            .bind(next)
            .bind(Utc::now())
            .bind(booking_id)
            .bind(servicer_id)
            .bind(booking.status)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Booking status changed concurrently".to_string())
            })?;

        tracing::info!(
            booking_id = %booking_id,
            status = ?next,
            "Booking status updated"
        );

        Ok(updated)
    }
}
