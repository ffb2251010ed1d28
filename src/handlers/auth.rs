//! Authentication API handlers

use axum::{extract::State, Json};
use validator::Validate;

use crate::error::ApiResult;
use crate::middleware::AuthenticatedUser;
use crate::models::{AuthTokensResponse, LoginRequest, RefreshRequest, RegisterRequest};
use crate::state::AppState;

/// Register a new account
pub async fn register(
    State(app_state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<AuthTokensResponse>> {
    request.validate()?;

    let tokens = app_state.auth_service.register(request).await?;
    Ok(Json(tokens))
}

/// Log in with email and password
pub async fn login(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthTokensResponse>> {
    request.validate()?;

    let tokens = app_state.auth_service.login(request).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new token pair
pub async fn refresh(
    State(app_state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<AuthTokensResponse>> {
    let tokens = app_state.auth_service.refresh(&request.refresh_token).await?;
    Ok(Json(tokens))
}

/// Revoke the caller's session
pub async fn logout(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<serde_json::Value>> {
    app_state.auth_service.logout(&user.jti).await?;
    Ok(Json(serde_json::json!({ "logged_out": true })))
}
