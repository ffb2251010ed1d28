//! Route definitions for the Servika API

mod admin;
mod auth;
mod servicer;
mod user;

pub use admin::admin_routes;
pub use auth::auth_routes;
pub use servicer::servicer_routes;
pub use user::user_routes;
