//! Complaint domain module
//!
//! Filing, response threads, and admin resolution.

mod model;
mod service;

pub use model::*;
pub use service::ComplaintService;
