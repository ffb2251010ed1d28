//! Refund workflow tests
//!
//! Validates the cancellation refund tiers and the servicer deadline
//! state machine: pending -> overdue by the clock, escalation on report,
//! and wallet settlement on processing.

use chrono::{Duration, Utc};
use servika_server::refund::{refund_amount, refund_percentage};

// ============================================================================
// Tier calculator
// ============================================================================

#[test]
fn test_full_refund_at_24_hours_or_more() {
    assert_eq!(refund_percentage(Duration::hours(24)), 100);
    assert_eq!(refund_percentage(Duration::hours(48)), 100);
    assert_eq!(refund_percentage(Duration::days(30)), 100);
}

#[test]
fn test_partial_refund_bands() {
    assert_eq!(refund_percentage(Duration::hours(23)), 75);
    assert_eq!(refund_percentage(Duration::hours(12)), 75);
    assert_eq!(refund_percentage(Duration::hours(11)), 50);
    assert_eq!(refund_percentage(Duration::hours(6)), 50);
    assert_eq!(refund_percentage(Duration::hours(5)), 25);
    assert_eq!(refund_percentage(Duration::hours(2)), 25);
}

#[test]
fn test_no_refund_under_two_hours() {
    assert_eq!(refund_percentage(Duration::minutes(119)), 0);
    assert_eq!(refund_percentage(Duration::hours(1)), 0);
    assert_eq!(refund_percentage(Duration::zero()), 0);
    // A start time already in the past yields nothing
    assert_eq!(refund_percentage(Duration::hours(-3)), 0);
}

#[test]
fn test_refund_amount_truncates_toward_zero() {
    assert_eq!(refund_amount(10050, 75), 7537);
    assert_eq!(refund_amount(1, 25), 0);
    assert_eq!(refund_amount(0, 100), 0);
}

// ============================================================================
// Database-backed workflow tests (require TEST_DATABASE_URL)
// ============================================================================

mod db {
    use super::*;
    use sqlx::PgPool;
    use uuid::Uuid;

    use servika_server::booking::{BookingService, CreateBookingRequest};
    use servika_server::models::UserRole;
    use servika_server::refund::{RefundService, RefundStatus};
    use servika_server::wallet::WalletService;

    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/servika_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    async fn seed_user(pool: &PgPool, role: UserRole) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, role, suspended, created_at, updated_at)
            VALUES ($1, $2, 'x', 'Test User', $3, FALSE, $4, $4)
            "#,
        )
        .bind(id)
        .bind(format!("{}@test.example", id))
        .bind(role)
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to seed user");

        sqlx::query("INSERT INTO wallets (user_id, balance, updated_at) VALUES ($1, 0, $2)")
            .bind(id)
            .bind(Utc::now())
            .execute(pool)
            .await
            .expect("Failed to seed wallet");

        id
    }

    async fn seed_cancelled_booking(
        pool: &PgPool,
        lead_hours: i64,
    ) -> (Uuid, Uuid, Uuid) {
        let customer_id = seed_user(pool, UserRole::Customer).await;
        let servicer_id = seed_user(pool, UserRole::Servicer).await;

        let booking_service = BookingService::new(pool.clone(), 48);
        let booking = booking_service
            .create_booking(
                customer_id,
                CreateBookingRequest {
                    servicer_id,
                    service_description: "Deep clean".to_string(),
                    service_start_at: Utc::now() + Duration::hours(lead_hours),
                    total_amount: 10000,
                },
            )
            .await
            .expect("Failed to create booking");

        let cancelled = booking_service
            .cancel_booking(customer_id, booking.id)
            .await
            .expect("Failed to cancel booking");
        assert!(cancelled.refund.is_some());

        (customer_id, servicer_id, booking.id)
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_cancellation_creates_pending_refund_entry() {
        let pool = setup_test_db().await;
        let (_customer, servicer, booking_id) = seed_cancelled_booking(&pool, 72).await;

        let refund_service = RefundService::new(pool.clone());
        let entry = refund_service
            .get_by_booking(booking_id)
            .await
            .expect("Refund entry should exist");

        assert_eq!(entry.status, RefundStatus::Pending);
        assert_eq!(entry.refund_percentage, 100);
        assert_eq!(entry.refund_amount, 10000);
        assert_eq!(entry.servicer_id, servicer);
        // Deadline is 48 hours after cancellation
        let window = entry.deadline_at - entry.cancelled_at;
        assert_eq!(window.num_hours(), 48);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_processing_credits_customer_wallet() {
        let pool = setup_test_db().await;
        let (customer, servicer, booking_id) = seed_cancelled_booking(&pool, 18).await;

        let refund_service = RefundService::new(pool.clone());
        let processed = refund_service
            .process_refund(servicer, booking_id)
            .await
            .expect("Servicer should be able to process");

        assert_eq!(processed.status, RefundStatus::Completed);
        assert_eq!(processed.processed_by, Some(servicer));

        let wallet = WalletService::new(pool.clone())
            .get_wallet(customer)
            .await
            .expect("Customer wallet should exist");
        // 75% tier on a 10000 booking
        assert_eq!(wallet.balance, 7500);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_double_processing_is_rejected() {
        let pool = setup_test_db().await;
        let (_customer, servicer, booking_id) = seed_cancelled_booking(&pool, 18).await;

        let refund_service = RefundService::new(pool.clone());
        refund_service
            .process_refund(servicer, booking_id)
            .await
            .expect("First processing should succeed");

        let second = refund_service.process_refund(servicer, booking_id).await;
        assert!(second.is_err(), "Second processing must be rejected");
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_report_within_window_is_rejected() {
        let pool = setup_test_db().await;
        let (customer, _servicer, booking_id) = seed_cancelled_booking(&pool, 18).await;

        let refund_service = RefundService::new(pool.clone());
        let result = refund_service.report_delay(customer, booking_id).await;
        assert!(
            result.is_err(),
            "Delay reports before the deadline must be rejected"
        );
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_report_after_deadline_escalates() {
        let pool = setup_test_db().await;
        let (customer, _servicer, booking_id) = seed_cancelled_booking(&pool, 18).await;

        // Backdate the deadline so the entry is effectively overdue
        sqlx::query("UPDATE refund_entries SET deadline_at = $1 WHERE booking_id = $2")
            .bind(Utc::now() - Duration::hours(1))
            .bind(booking_id)
            .execute(&pool)
            .await
            .expect("Failed to backdate deadline");

        let refund_service = RefundService::new(pool.clone());
        let escalated = refund_service
            .report_delay(customer, booking_id)
            .await
            .expect("Overdue refunds can be reported");

        assert_eq!(escalated.status, RefundStatus::Escalated);
        assert!(escalated.issue_reported);
        assert_eq!(escalated.reported_by, Some(customer));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_sweeper_flips_pending_past_deadline() {
        let pool = setup_test_db().await;
        let (_customer, _servicer, booking_id) = seed_cancelled_booking(&pool, 18).await;

        sqlx::query("UPDATE refund_entries SET deadline_at = $1 WHERE booking_id = $2")
            .bind(Utc::now() - Duration::minutes(5))
            .bind(booking_id)
            .execute(&pool)
            .await
            .expect("Failed to backdate deadline");

        let refund_service = RefundService::new(pool.clone());
        let flipped = refund_service.sweep_overdue().await.expect("Sweep failed");
        assert!(flipped.iter().any(|(_, number)| !number.is_empty()));

        let entry = refund_service
            .get_by_booking(booking_id)
            .await
            .expect("Entry should still exist");
        assert_eq!(entry.status, RefundStatus::Overdue);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_admin_processes_escalated_refund_and_penalizes() {
        let pool = setup_test_db().await;
        let (customer, servicer, booking_id) = seed_cancelled_booking(&pool, 18).await;
        let admin = seed_user(&pool, UserRole::Admin).await;

        sqlx::query("UPDATE refund_entries SET deadline_at = $1 WHERE booking_id = $2")
            .bind(Utc::now() - Duration::hours(10))
            .bind(booking_id)
            .execute(&pool)
            .await
            .expect("Failed to backdate deadline");

        let refund_service = RefundService::new(pool.clone());
        let escalated = refund_service
            .report_delay(customer, booking_id)
            .await
            .expect("Report should escalate");

        let processed = refund_service
            .admin_process_refund(admin, escalated.id)
            .await
            .expect("Admin should be able to process");
        assert_eq!(processed.status, RefundStatus::Completed);
        assert_eq!(processed.processed_by, Some(admin));

        let penalty_count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM servicer_penalties WHERE servicer_id = $1 AND refund_id = $2",
        )
        .bind(servicer)
        .bind(escalated.id)
        .fetch_one(&pool)
        .await
        .expect("Penalty query failed");
        assert_eq!(penalty_count.0, 1);
    }
}
