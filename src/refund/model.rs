//! Refund models and the eligibility tier calculator

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Refund entry status
///
/// `pending -> overdue` is a pure clock predicate (the 48h servicer window
/// has elapsed); `completed` and `escalated` require explicit actions.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "refund_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Pending,
    Overdue,
    Escalated,
    Completed,
}

/// Refund owed to a customer after cancellation
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct RefundEntry {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub booking_number: String,
    pub customer_id: Uuid,
    pub servicer_id: Uuid,
    pub refund_amount: i64,
    pub refund_percentage: i16,
    pub cancelled_at: DateTime<Utc>,
    pub deadline_at: DateTime<Utc>,
    pub status: RefundStatus,
    pub issue_reported: bool,
    pub reported_by: Option<Uuid>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefundEntry {
    /// Status as of `now`, folding the clock predicate into the stored state.
    ///
    /// The sweeper materializes pending -> overdue once a minute; reads in
    /// between still see the correct state through this method.
    pub fn effective_status(&self, now: DateTime<Utc>) -> RefundStatus {
        match self.status {
            RefundStatus::Pending if now > self.deadline_at => RefundStatus::Overdue,
            other => other,
        }
    }

    /// API view with exactly one of hours_remaining / hours_overdue set
    pub fn to_response(&self, now: DateTime<Utc>) -> RefundEntryResponse {
        let status = self.effective_status(now);
        let (hours_remaining, hours_overdue) = match status {
            RefundStatus::Completed => (None, None),
            _ if now > self.deadline_at => {
                (None, Some((now - self.deadline_at).num_hours()))
            }
            _ => (Some((self.deadline_at - now).num_hours()), None),
        };

        RefundEntryResponse {
            id: self.id,
            booking_id: self.booking_id,
            booking_number: self.booking_number.clone(),
            refund_amount: self.refund_amount,
            refund_percentage: self.refund_percentage,
            cancelled_at: self.cancelled_at,
            deadline_at: self.deadline_at,
            status,
            issue_reported: self.issue_reported,
            hours_remaining,
            hours_overdue,
            processed_at: self.processed_at,
        }
    }
}

/// Refund entry as returned by the API
#[derive(Debug, Serialize)]
pub struct RefundEntryResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub booking_number: String,
    pub refund_amount: i64,
    pub refund_percentage: i16,
    pub cancelled_at: DateTime<Utc>,
    pub deadline_at: DateTime<Utc>,
    pub status: RefundStatus,
    pub issue_reported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_overdue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Per-servicer refund worklist, bucketed by effective status
#[derive(Debug, Serialize)]
pub struct RefundQueueResponse {
    pub pending: Vec<RefundEntryResponse>,
    pub overdue: Vec<RefundEntryResponse>,
    pub escalated: Vec<RefundEntryResponse>,
    pub completed: Vec<RefundEntryResponse>,
}

impl RefundQueueResponse {
    /// Partition entries into worklist buckets as of `now`
    pub fn from_entries(entries: Vec<RefundEntry>, now: DateTime<Utc>) -> Self {
        let mut queue = RefundQueueResponse {
            pending: Vec::new(),
            overdue: Vec::new(),
            escalated: Vec::new(),
            completed: Vec::new(),
        };

        for entry in entries {
            let response = entry.to_response(now);
            match response.status {
                RefundStatus::Pending => queue.pending.push(response),
                RefundStatus::Overdue => queue.overdue.push(response),
                RefundStatus::Escalated => queue.escalated.push(response),
                RefundStatus::Completed => queue.completed.push(response),
            }
        }

        queue
    }
}

/// Refund eligibility preview for a booking that has not been cancelled yet
#[derive(Debug, Serialize)]
pub struct RefundEligibilityResponse {
    pub booking_id: Uuid,
    pub booking_number: String,
    pub cancellable: bool,
    pub refund_percentage: i16,
    pub refund_amount: i64,
    pub hours_until_service: i64,
}

/// Refund percentage for a cancellation `lead` before the scheduled
/// service start.
///
/// Band lower bounds are inclusive: cancelling exactly 24 hours before the
/// start still yields a full refund.
pub fn refund_percentage(lead: Duration) -> i16 {
    if lead >= Duration::hours(24) {
        100
    } else if lead >= Duration::hours(12) {
        75
    } else if lead >= Duration::hours(6) {
        50
    } else if lead >= Duration::hours(2) {
        25
    } else {
        0
    }
}

/// Refund amount for a booking total at a given percentage
pub fn refund_amount(total_amount: i64, percentage: i16) -> i64 {
    total_amount * percentage as i64 / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with(status: RefundStatus, deadline_at: DateTime<Utc>) -> RefundEntry {
        let now = Utc::now();
        RefundEntry {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            booking_number: "BK-TEST0001".to_string(),
            customer_id: Uuid::new_v4(),
            servicer_id: Uuid::new_v4(),
            refund_amount: 7500,
            refund_percentage: 75,
            cancelled_at: deadline_at - Duration::hours(48),
            deadline_at,
            status,
            issue_reported: false,
            reported_by: None,
            processed_by: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tier_bands() {
        assert_eq!(refund_percentage(Duration::hours(72)), 100);
        assert_eq!(refund_percentage(Duration::hours(18)), 75);
        assert_eq!(refund_percentage(Duration::hours(8)), 50);
        assert_eq!(refund_percentage(Duration::hours(3)), 25);
        assert_eq!(refund_percentage(Duration::hours(1)), 0);
        assert_eq!(refund_percentage(Duration::zero()), 0);
    }

    #[test]
    fn test_tier_boundaries_inclusive_on_lower_bound() {
        assert_eq!(refund_percentage(Duration::hours(24)), 100);
        assert_eq!(refund_percentage(Duration::hours(12)), 75);
        assert_eq!(refund_percentage(Duration::hours(6)), 50);
        assert_eq!(refund_percentage(Duration::hours(2)), 25);

        // One minute under the boundary drops into the band below
        assert_eq!(
            refund_percentage(Duration::hours(24) - Duration::minutes(1)),
            75
        );
        assert_eq!(
            refund_percentage(Duration::hours(2) - Duration::minutes(1)),
            0
        );
    }

    #[test]
    fn test_refund_amount_rounds_down() {
        assert_eq!(refund_amount(10000, 100), 10000);
        assert_eq!(refund_amount(10000, 75), 7500);
        assert_eq!(refund_amount(999, 25), 249);
        assert_eq!(refund_amount(10000, 0), 0);
    }

    #[test]
    fn test_effective_status_clock_predicate() {
        let now = Utc::now();

        let pending = entry_with(RefundStatus::Pending, now + Duration::hours(10));
        assert_eq!(pending.effective_status(now), RefundStatus::Pending);

        let past_deadline = entry_with(RefundStatus::Pending, now - Duration::hours(1));
        assert_eq!(past_deadline.effective_status(now), RefundStatus::Overdue);

        // Explicit states are not affected by the clock
        let completed = entry_with(RefundStatus::Completed, now - Duration::hours(1));
        assert_eq!(completed.effective_status(now), RefundStatus::Completed);
    }

    #[test]
    fn test_response_exposes_exactly_one_hours_field() {
        let now = Utc::now();

        let pending = entry_with(RefundStatus::Pending, now + Duration::hours(10));
        let response = pending.to_response(now);
        assert!(response.hours_remaining.is_some());
        assert!(response.hours_overdue.is_none());

        let overdue = entry_with(RefundStatus::Pending, now - Duration::hours(5));
        let response = overdue.to_response(now);
        assert!(response.hours_remaining.is_none());
        assert_eq!(response.hours_overdue, Some(5));
        assert_eq!(response.status, RefundStatus::Overdue);

        let completed = entry_with(RefundStatus::Completed, now - Duration::hours(5));
        let response = completed.to_response(now);
        assert!(response.hours_remaining.is_none());
        assert!(response.hours_overdue.is_none());
    }

    #[test]
    fn test_queue_partitioning() {
        let now = Utc::now();
        let entries = vec![
            entry_with(RefundStatus::Pending, now + Duration::hours(40)),
            entry_with(RefundStatus::Pending, now - Duration::hours(2)),
            entry_with(RefundStatus::Overdue, now - Duration::hours(20)),
            entry_with(RefundStatus::Escalated, now - Duration::hours(60)),
            entry_with(RefundStatus::Completed, now - Duration::hours(10)),
        ];

        let queue = RefundQueueResponse::from_entries(entries, now);
        assert_eq!(queue.pending.len(), 1);
        // The stored-pending entry past its deadline lands in overdue
        assert_eq!(queue.overdue.len(), 2);
        assert_eq!(queue.escalated.len(), 1);
        assert_eq!(queue.completed.len(), 1);
    }
}
