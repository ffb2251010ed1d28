//! Refund domain module
//!
//! Contains the eligibility tier calculator, the refund entry models, the
//! deadline state machine service, and the overdue sweeper.

mod model;
mod service;
mod sweeper;

pub use model::*;
pub use service::RefundService;
pub use sweeper::overdue_sweeper;
