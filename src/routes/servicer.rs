//! Servicer-facing routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{booking, refund};
use crate::state::AppState;

pub fn servicer_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(booking::list_servicer_bookings))
        .route("/bookings/:id/accept", post(booking::accept_booking))
        .route("/bookings/:id/start", post(booking::start_booking))
        .route("/bookings/:id/complete", post(booking::complete_booking))
        .route("/refunds", get(refund::servicer_refund_queue))
        .route(
            "/bookings/:id/process-refund",
            post(refund::process_refund),
        )
        .route(
            "/bookings/:id/report-refund-issue",
            post(refund::report_refund_delay),
        )
}
