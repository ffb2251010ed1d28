//! HTTP handlers, grouped by API surface

pub mod admin;
pub mod auth;
pub mod booking;
pub mod complaint;
pub mod refund;
pub mod wallet;
