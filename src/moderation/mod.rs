//! Moderation domain module
//!
//! Blacklist (suspensions) and servicer verification review.

mod model;
mod service;

pub use model::*;
pub use service::ModerationService;
