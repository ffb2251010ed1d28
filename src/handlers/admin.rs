//! Admin API handlers: moderation, oversight, and escalated refunds

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::booking::{Booking, ListBookingsQuery};
use crate::complaint::{
    Complaint, ComplaintWithThread, ListComplaintsQuery, ResolveComplaintRequest,
};
use crate::error::ApiResult;
use crate::middleware::AdminUser;
use crate::models::PaginationParams;
use crate::moderation::{
    BlacklistEntry, ReviewVerificationRequest, SuspendRequest, Verification, VerificationStatus,
};
use crate::refund::RefundEntryResponse;
use crate::state::AppState;

/// Active blacklist entries
pub async fn list_blacklist(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<Vec<BlacklistEntry>>> {
    let entries = app_state.moderation_service.list_blacklist(&pagination).await?;
    Ok(Json(entries))
}

/// Suspend a user
pub async fn suspend_user(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SuspendRequest>,
) -> ApiResult<Json<BlacklistEntry>> {
    request.validate()?;

    let entry = app_state
        .moderation_service
        .suspend_user(admin.user_id, user_id, request)
        .await?;

    Ok(Json(entry))
}

/// Lift a user's active suspension
pub async fn unsuspend_user(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<BlacklistEntry>> {
    let entry = app_state
        .moderation_service
        .unsuspend_user(admin.user_id, user_id)
        .await?;

    Ok(Json(entry))
}

/// List all bookings, with optional status filtering
pub async fn list_bookings(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ListBookingsQuery>,
) -> ApiResult<Json<Vec<Booking>>> {
    let bookings = app_state
        .booking_service
        .list_bookings(None, None, &query)
        .await?;

    Ok(Json(bookings))
}

/// Fetch any booking
pub async fn get_booking(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = app_state.booking_service.get_booking(booking_id, None).await?;
    Ok(Json(booking))
}

/// List complaints with filtering and pagination
pub async fn list_complaints(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ListComplaintsQuery>,
) -> ApiResult<Json<Vec<Complaint>>> {
    let complaints = app_state.complaint_service.list_complaints(&query).await?;
    Ok(Json(complaints))
}

/// Fetch any complaint with its response thread
pub async fn get_complaint(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(complaint_id): Path<Uuid>,
) -> ApiResult<Json<ComplaintWithThread>> {
    let complaint = app_state
        .complaint_service
        .get_complaint(complaint_id, None)
        .await?;

    Ok(Json(complaint))
}

/// Resolve a complaint with a resolution summary
pub async fn resolve_complaint(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(complaint_id): Path<Uuid>,
    Json(request): Json<ResolveComplaintRequest>,
) -> ApiResult<Json<Complaint>> {
    request.validate()?;

    let complaint = app_state
        .complaint_service
        .resolve(complaint_id, admin.user_id, &request.resolution)
        .await?;

    Ok(Json(complaint))
}

/// Reject a complaint without resolution
pub async fn reject_complaint(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(complaint_id): Path<Uuid>,
) -> ApiResult<Json<Complaint>> {
    let complaint = app_state.complaint_service.reject(complaint_id).await?;
    Ok(Json(complaint))
}

/// Query parameters for the verification list
#[derive(Debug, Deserialize)]
pub struct ListVerificationsQuery {
    pub status: Option<VerificationStatus>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

/// Servicer verifications, oldest first
pub async fn list_verifications(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ListVerificationsQuery>,
) -> ApiResult<Json<Vec<Verification>>> {
    let pagination = PaginationParams {
        page: query.page,
        limit: query.limit,
    };

    let verifications = app_state
        .moderation_service
        .list_verifications(query.status, &pagination)
        .await?;

    Ok(Json(verifications))
}

/// Approve a pending verification
pub async fn approve_verification(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(verification_id): Path<Uuid>,
    Json(request): Json<ReviewVerificationRequest>,
) -> ApiResult<Json<Verification>> {
    request.validate()?;

    let verification = app_state
        .moderation_service
        .approve_verification(admin.user_id, verification_id, request.notes)
        .await?;

    Ok(Json(verification))
}

/// Reject a pending verification
pub async fn reject_verification(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(verification_id): Path<Uuid>,
    Json(request): Json<ReviewVerificationRequest>,
) -> ApiResult<Json<Verification>> {
    request.validate()?;

    let verification = app_state
        .moderation_service
        .reject_verification(admin.user_id, verification_id, request.notes)
        .await?;

    Ok(Json(verification))
}

/// Escalated refunds awaiting admin action, oldest deadline first
pub async fn list_escalated_refunds(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<Vec<RefundEntryResponse>>> {
    let entries = app_state.refund_service.list_escalated(&pagination).await?;
    let now = Utc::now();

    Ok(Json(
        entries.into_iter().map(|e| e.to_response(now)).collect(),
    ))
}

/// Process an escalated refund directly, penalizing the servicer
pub async fn process_escalated_refund(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(refund_id): Path<Uuid>,
) -> ApiResult<Json<RefundEntryResponse>> {
    let entry = app_state
        .refund_service
        .admin_process_refund(admin.user_id, refund_id)
        .await?;

    Ok(Json(entry.to_response(Utc::now())))
}
