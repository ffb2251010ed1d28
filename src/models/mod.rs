//! Shared data models for the Servika backend

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod auth;
pub use auth::*;

/// User model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub suspended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User roles
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Servicer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Servicer => "servicer",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(UserRole::Customer),
            "servicer" => Some(UserRole::Servicer),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Pagination parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

impl PaginationParams {
    /// Normalize into (page, limit, offset) with sane bounds
    ///
    /// Offset arithmetic widens to i64 first; `page * limit` can exceed
    /// i32 for caller-supplied values.
    pub fn normalize(&self) -> (i32, i32, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page as i64 - 1) * limit as i64;
        (page, limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Customer, UserRole::Servicer, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("superuser"), None);
    }

    #[test]
    fn test_pagination_normalize_defaults() {
        let params = PaginationParams {
            page: None,
            limit: None,
        };
        assert_eq!(params.normalize(), (1, 20, 0));
    }

    #[test]
    fn test_pagination_normalize_clamps() {
        let params = PaginationParams {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(params.normalize(), (1, 100, 0));

        let params = PaginationParams {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(params.normalize(), (3, 10, 20));
    }

    #[test]
    fn test_pagination_max_page_does_not_overflow() {
        let params = PaginationParams {
            page: Some(i32::MAX),
            limit: Some(100),
        };
        let (page, limit, offset) = params.normalize();
        assert_eq!(page, i32::MAX);
        assert_eq!(limit, 100);
        assert_eq!(offset, (i32::MAX as i64 - 1) * 100);
        assert!(offset > 0);
    }
}
