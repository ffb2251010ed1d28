//! Complaint API handlers for complainants

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::complaint::{
    Complaint, ComplaintResponse, ComplaintWithThread, CreateComplaintRequest, RespondRequest,
};
use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// File a new complaint
pub async fn create_complaint(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateComplaintRequest>,
) -> ApiResult<Json<Complaint>> {
    request.validate()?;

    let complaint = app_state
        .complaint_service
        .create_complaint(user.user_id, request)
        .await?;

    Ok(Json(complaint))
}

/// List the caller's complaints
pub async fn list_my_complaints(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<Complaint>>> {
    let complaints = app_state
        .complaint_service
        .list_for_complainant(user.user_id)
        .await?;

    Ok(Json(complaints))
}

/// Get one of the caller's complaints with its response thread
pub async fn get_my_complaint(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(complaint_id): Path<Uuid>,
) -> ApiResult<Json<ComplaintWithThread>> {
    let complaint = app_state
        .complaint_service
        .get_complaint(complaint_id, Some(user.user_id))
        .await?;

    Ok(Json(complaint))
}

/// Add a response to the caller's complaint thread
pub async fn respond_to_complaint(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(complaint_id): Path<Uuid>,
    Json(request): Json<RespondRequest>,
) -> ApiResult<Json<ComplaintResponse>> {
    request.validate()?;

    let response = app_state
        .complaint_service
        .respond(complaint_id, user.user_id, user.role, &request.body)
        .await?;

    Ok(Json(response))
}
