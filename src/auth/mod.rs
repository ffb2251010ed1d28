//! Authentication module for Servika
//!
//! Provides email/password authentication with:
//! - bcrypt password hashing
//! - JWT token generation and validation
//! - Session management with refresh token rotation

mod jwt;
mod service;

pub use jwt::{generate_access_token, generate_refresh_token, verify_token, Claims};
pub use service::{AuthError, AuthService};
