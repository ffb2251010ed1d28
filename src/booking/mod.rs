//! Booking domain module
//!
//! Models and service for the booking lifecycle, including cancellation
//! and the refund entry it spawns.

mod model;
mod service;

pub use model::*;
pub use service::BookingService;
