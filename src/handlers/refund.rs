//! Refund API handlers
//!
//! Customers report delays, servicers work their refund queue, admins
//! process escalated entries.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::{AuthenticatedUser, ServicerUser};
use crate::refund::{RefundEntryResponse, RefundQueueResponse};
use crate::state::AppState;

/// Servicer's refund worklist, bucketed by effective status as of now
pub async fn servicer_refund_queue(
    State(app_state): State<AppState>,
    ServicerUser(user): ServicerUser,
) -> ApiResult<Json<RefundQueueResponse>> {
    let entries = app_state.refund_service.servicer_queue(user.user_id).await?;

    Ok(Json(RefundQueueResponse::from_entries(entries, Utc::now())))
}

/// Servicer processes the refund owed on a cancelled booking
pub async fn process_refund(
    State(app_state): State<AppState>,
    ServicerUser(user): ServicerUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<RefundEntryResponse>> {
    let entry = app_state
        .refund_service
        .process_refund(user.user_id, booking_id)
        .await?;

    Ok(Json(entry.to_response(Utc::now())))
}

/// Either party to the booking reports a missed refund deadline,
/// escalating the entry to admins
pub async fn report_refund_delay(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<RefundEntryResponse>> {
    let entry = app_state
        .refund_service
        .report_delay(user.user_id, booking_id)
        .await?;

    Ok(Json(entry.to_response(Utc::now())))
}
