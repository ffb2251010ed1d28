//! Booking models and the status transition matrix

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::refund::RefundEntryResponse;

/// Booking status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether `self -> next` is an allowed transition.
    ///
    /// Transitions are monotonic: no un-cancelling, no un-completing.
    /// Cancellation is only possible before work starts.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Accepted, InProgress)
                | (InProgress, Completed)
                | (Pending, Cancelled)
                | (Accepted, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

/// Payment state of a booking
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    RefundPending,
    Refunded,
}

/// Booking model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub booking_number: String,
    pub customer_id: Uuid,
    pub servicer_id: Uuid,
    pub service_description: String,
    pub service_start_at: DateTime<Utc>,
    /// Amount in minor currency units
    pub total_amount: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a booking
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub servicer_id: Uuid,
    #[validate(length(min = 1, max = 2000))]
    pub service_description: String,
    pub service_start_at: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub total_amount: i64,
}

/// Query parameters for listing bookings
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub status: Option<BookingStatus>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

/// Response DTO for cancellation, carrying the refund entry when one was
/// created (zero-tier cancellations owe nothing)
#[derive(Debug, Serialize)]
pub struct CancelBookingResponse {
    pub booking: Booking,
    pub refund: Option<RefundEntryResponse>,
}

/// Generate a human-readable booking reference, e.g. "BK-7F3K9QX2"
pub fn generate_booking_number() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("BK-{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Accepted.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn test_cancellation_only_before_work_starts() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Accepted.can_transition_to(Cancelled));
        assert!(!InProgress.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!Accepted.can_transition_to(Pending));
        assert!(!InProgress.can_transition_to(Accepted));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Accepted));
    }

    #[test]
    fn test_terminal_states() {
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!Accepted.is_terminal());
        assert!(!InProgress.is_terminal());

        for status in [Pending, Accepted, InProgress] {
            assert!(!Completed.can_transition_to(status));
            assert!(!Cancelled.can_transition_to(status));
        }
    }

    #[test]
    fn test_booking_number_format() {
        let number = generate_booking_number();
        assert!(number.starts_with("BK-"));
        assert_eq!(number.len(), 11);
        // Ambiguous characters are excluded from the charset
        assert!(!number[3..].contains('O'));
        assert!(!number[3..].contains('0'));
        assert!(!number[3..].contains('I'));
        assert!(!number[3..].contains('1'));
    }
}
