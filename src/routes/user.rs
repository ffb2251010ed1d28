//! Customer-facing routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{booking, complaint, refund, wallet};
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bookings",
            post(booking::create_booking).get(booking::list_customer_bookings),
        )
        .route("/bookings/:id", get(booking::get_customer_booking))
        .route("/bookings/:id/cancel", post(booking::cancel_booking))
        .route(
            "/bookings/:id/refund-eligibility",
            get(booking::refund_eligibility),
        )
        .route(
            "/bookings/:id/report-refund-delay",
            post(refund::report_refund_delay),
        )
        .route("/complaints/create", post(complaint::create_complaint))
        .route("/complaints", get(complaint::list_my_complaints))
        .route("/complaints/:id", get(complaint::get_my_complaint))
        .route(
            "/complaints/:id/respond",
            post(complaint::respond_to_complaint),
        )
        .route("/wallet", get(wallet::get_wallet))
        .route(
            "/wallet/transactions",
            get(wallet::list_wallet_transactions),
        )
}
