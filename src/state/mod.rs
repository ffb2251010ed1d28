//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::AuthService;
use crate::booking::BookingService;
use crate::complaint::ComplaintService;
use crate::moderation::ModerationService;
use crate::refund::RefundService;
use crate::wallet::WalletService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub booking_service: Arc<BookingService>,
    pub refund_service: Arc<RefundService>,
    pub complaint_service: Arc<ComplaintService>,
    pub moderation_service: Arc<ModerationService>,
    pub wallet_service: Arc<WalletService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        booking_service: Arc<BookingService>,
        refund_service: Arc<RefundService>,
        complaint_service: Arc<ComplaintService>,
        moderation_service: Arc<ModerationService>,
        wallet_service: Arc<WalletService>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            booking_service,
            refund_service,
            complaint_service,
            moderation_service,
            wallet_service,
            auth_service,
        }
    }
}

impl FromRef<AppState> for Arc<BookingService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.booking_service.clone()
    }
}

impl FromRef<AppState> for Arc<RefundService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.refund_service.clone()
    }
}

impl FromRef<AppState> for Arc<ComplaintService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.complaint_service.clone()
    }
}

impl FromRef<AppState> for Arc<ModerationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.moderation_service.clone()
    }
}

impl FromRef<AppState> for Arc<WalletService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.wallet_service.clone()
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}
