//! Moderation models: blacklist entries and servicer verifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Ban type for suspensions
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "ban_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BanType {
    Temporary,
    Permanent,
}

/// A suspension on the blacklist
///
/// `ban_until` is null iff the ban is permanent (also enforced by a DB
/// check constraint).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct BlacklistEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ban_type: BanType,
    pub ban_until: Option<DateTime<Utc>>,
    pub reason: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub lifted_at: Option<DateTime<Utc>>,
    pub lifted_by: Option<Uuid>,
}

/// Request DTO for suspending a user
#[derive(Debug, Deserialize, Validate)]
pub struct SuspendRequest {
    pub ban_type: BanType,
    /// Required for temporary bans, forbidden for permanent ones
    pub ban_until: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 2000))]
    pub reason: String,
}

impl SuspendRequest {
    /// Check the ban_until/ban_type pairing invariant
    pub fn check_ban_until(&self) -> Result<(), String> {
        match (self.ban_type, self.ban_until) {
            (BanType::Temporary, None) => {
                Err("Temporary bans require a ban_until timestamp".to_string())
            }
            (BanType::Permanent, Some(_)) => {
                Err("Permanent bans must not set ban_until".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Verification status for servicer documents
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Servicer verification submission
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Verification {
    pub id: Uuid,
    pub servicer_id: Uuid,
    pub document_url: String,
    pub status: VerificationStatus,
    pub notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for the verification review verdict
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewVerificationRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_until_pairing() {
        let temporary_without_until = SuspendRequest {
            ban_type: BanType::Temporary,
            ban_until: None,
            reason: "spam".to_string(),
        };
        assert!(temporary_without_until.check_ban_until().is_err());

        let permanent_with_until = SuspendRequest {
            ban_type: BanType::Permanent,
            ban_until: Some(Utc::now()),
            reason: "fraud".to_string(),
        };
        assert!(permanent_with_until.check_ban_until().is_err());

        let temporary_ok = SuspendRequest {
            ban_type: BanType::Temporary,
            ban_until: Some(Utc::now()),
            reason: "spam".to_string(),
        };
        assert!(temporary_ok.check_ban_until().is_ok());

        let permanent_ok = SuspendRequest {
            ban_type: BanType::Permanent,
            ban_until: None,
            reason: "fraud".to_string(),
        };
        assert!(permanent_ok.check_ban_until().is_ok());
    }
}
