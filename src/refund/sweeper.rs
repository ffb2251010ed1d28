//! Background job flipping pending refunds past their deadline to overdue

use std::sync::Arc;
use std::time::Duration;

use super::RefundService;

/// Run the overdue sweep forever at the configured interval
///
/// The pending -> overdue transition is a pure clock predicate; reads also
/// compute it on the fly, so the sweep only materializes state for queries
/// that filter on the stored status column.
pub async fn overdue_sweeper(refund_service: Arc<RefundService>, interval_seconds: u64) {
    tracing::info!(interval_seconds, "Starting overdue refund sweeper");

    loop {
        tokio::time::sleep(Duration::from_secs(interval_seconds)).await;

        match refund_service.sweep_overdue().await {
            Ok(flipped) => {
                for (refund_id, booking_number) in flipped {
                    tracing::warn!(
                        refund_id = %refund_id,
                        booking_number = %booking_number,
                        "Refund passed the servicer processing window"
                    );
                }
            }
            Err(e) => {
                tracing::error!("Error sweeping overdue refunds: {}", e);
            }
        }
    }
}
