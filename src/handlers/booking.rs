//! Booking API handlers for customers and servicers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::booking::{Booking, CancelBookingResponse, CreateBookingRequest, ListBookingsQuery};
use crate::error::ApiResult;
use crate::middleware::{CustomerUser, ServicerUser};
use crate::refund::RefundEligibilityResponse;
use crate::state::AppState;

/// Customer creates a booking
pub async fn create_booking(
    State(app_state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Json(request): Json<CreateBookingRequest>,
) -> ApiResult<Json<Booking>> {
    request.validate()?;

    let booking = app_state
        .booking_service
        .create_booking(user.user_id, request)
        .await?;

    Ok(Json(booking))
}

/// Customer lists their bookings
pub async fn list_customer_bookings(
    State(app_state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Query(query): Query<ListBookingsQuery>,
) -> ApiResult<Json<Vec<Booking>>> {
    let bookings = app_state
        .booking_service
        .list_bookings(Some(user.user_id), None, &query)
        .await?;

    Ok(Json(bookings))
}

/// Customer fetches one of their bookings
pub async fn get_customer_booking(
    State(app_state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = app_state
        .booking_service
        .get_booking(booking_id, Some(user.user_id))
        .await?;

    Ok(Json(booking))
}

/// Customer cancels a booking; the response carries the refund entry when
/// the cancellation tier is non-zero
pub async fn cancel_booking(
    State(app_state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<CancelBookingResponse>> {
    let response = app_state
        .booking_service
        .cancel_booking(user.user_id, booking_id)
        .await?;

    Ok(Json(response))
}

/// Preview the refund a cancellation would yield right now
pub async fn refund_eligibility(
    State(app_state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<RefundEligibilityResponse>> {
    let eligibility = app_state
        .booking_service
        .refund_eligibility(user.user_id, booking_id)
        .await?;

    Ok(Json(eligibility))
}

/// Servicer lists bookings assigned to them
pub async fn list_servicer_bookings(
    State(app_state): State<AppState>,
    ServicerUser(user): ServicerUser,
    Query(query): Query<ListBookingsQuery>,
) -> ApiResult<Json<Vec<Booking>>> {
    let bookings = app_state
        .booking_service
        .list_bookings(None, Some(user.user_id), &query)
        .await?;

    Ok(Json(bookings))
}

/// Servicer accepts a pending booking
pub async fn accept_booking(
    State(app_state): State<AppState>,
    ServicerUser(user): ServicerUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = app_state
        .booking_service
        .accept_booking(user.user_id, booking_id)
        .await?;

    Ok(Json(booking))
}

/// Servicer starts work on an accepted booking
pub async fn start_booking(
    State(app_state): State<AppState>,
    ServicerUser(user): ServicerUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = app_state
        .booking_service
        .start_booking(user.user_id, booking_id)
        .await?;

    Ok(Json(booking))
}

/// Servicer completes an in-progress booking
pub async fn complete_booking(
    State(app_state): State<AppState>,
    ServicerUser(user): ServicerUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = app_state
        .booking_service
        .complete_booking(user.user_id, booking_id)
        .await?;

    Ok(Json(booking))
}
