//! Complaint models and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::UserRole;

/// Complaint category
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "complaint_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintCategory {
    ServiceQuality,
    Payment,
    Conduct,
    Other,
}

/// Complaint severity
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "complaint_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComplaintSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Complaint status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "complaint_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Pending,
    Investigating,
    Resolved,
    Rejected,
    Closed,
}

impl ComplaintStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ComplaintStatus::Resolved | ComplaintStatus::Rejected | ComplaintStatus::Closed
        )
    }
}

/// Complaint model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Complaint {
    pub id: Uuid,
    pub complainant_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub category: ComplaintCategory,
    pub severity: ComplaintSeverity,
    pub status: ComplaintStatus,
    pub description: String,
    pub evidence_urls: Vec<String>,
    /// Populated only when status = resolved
    pub resolution: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One message in a complaint's response thread
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ComplaintResponse {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub responder_id: Uuid,
    pub responder_role: UserRole,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Complaint together with its response thread
#[derive(Debug, Serialize)]
pub struct ComplaintWithThread {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub responses: Vec<ComplaintResponse>,
}

/// Request DTO for filing a complaint
#[derive(Debug, Deserialize, Validate)]
pub struct CreateComplaintRequest {
    pub booking_id: Option<Uuid>,
    pub category: ComplaintCategory,
    pub severity: ComplaintSeverity,
    #[validate(length(min = 10, max = 5000))]
    pub description: String,
    #[validate(length(max = 10))]
    pub evidence_urls: Option<Vec<String>>,
}

/// Request DTO for adding a response to the thread
#[derive(Debug, Deserialize, Validate)]
pub struct RespondRequest {
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

/// Request DTO for admin resolution
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveComplaintRequest {
    #[validate(length(min = 1, max = 5000))]
    pub resolution: String,
}

/// Query parameters for the admin complaint list
#[derive(Debug, Deserialize)]
pub struct ListComplaintsQuery {
    pub status: Option<ComplaintStatus>,
    pub category: Option<ComplaintCategory>,
    pub severity: Option<ComplaintSeverity>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(ComplaintStatus::Resolved.is_terminal());
        assert!(ComplaintStatus::Rejected.is_terminal());
        assert!(ComplaintStatus::Closed.is_terminal());
        assert!(!ComplaintStatus::Pending.is_terminal());
        assert!(!ComplaintStatus::Investigating.is_terminal());
    }
}
