//! Admin-facing routes

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::admin;
use crate::state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/blacklist", get(admin::list_blacklist))
        .route("/users/:id/suspend", post(admin::suspend_user))
        .route("/users/:id/unsuspend", post(admin::unsuspend_user))
        .route("/bookings", get(admin::list_bookings))
        .route("/bookings/:id", get(admin::get_booking))
        .route("/complaints", get(admin::list_complaints))
        .route("/complaints/:id", get(admin::get_complaint))
        .route("/complaints/:id/resolve", post(admin::resolve_complaint))
        .route("/complaints/:id/reject", post(admin::reject_complaint))
        .route("/verifications", get(admin::list_verifications))
        .route(
            "/verifications/:id/approve",
            put(admin::approve_verification),
        )
        .route(
            "/verifications/:id/reject",
            put(admin::reject_verification),
        )
        .route("/refunds/escalated", get(admin::list_escalated_refunds))
        .route(
            "/refunds/:id/process",
            post(admin::process_escalated_refund),
        )
}
