//! Complaint service layer - filing, response threads, admin resolution

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::complaint::{
    Complaint, ComplaintResponse, ComplaintStatus, ComplaintWithThread, CreateComplaintRequest,
    ListComplaintsQuery,
};
use crate::error::{ApiError, ApiResult};
use crate::models::{PaginationParams, UserRole};

/// Complaint service
pub struct ComplaintService {
    db_pool: PgPool,
}

impl ComplaintService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// File a new complaint
    pub async fn create_complaint(
        &self,
        complainant_id: Uuid,
        request: CreateComplaintRequest,
    ) -> ApiResult<Complaint> {
        if let Some(booking_id) = request.booking_id {
            let is_party: Option<(Uuid,)> = sqlx::query_as(
                "SELECT id FROM bookings WHERE id = $1 AND (customer_id = $2 OR servicer_id = $2)",
            )
            .bind(booking_id)
            .bind(complainant_id)
            .fetch_optional(&self.db_pool)
            .await?;

            if is_party.is_none() {
                return Err(ApiError::BadRequest(
                    "Referenced booking does not exist or does not involve you".to_string(),
                ));
            }
        }

        let complaint = sqlx::query_as::<_, Complaint>(
            r#"
            INSERT INTO complaints (
                id, complainant_id, booking_id, category, severity, status,
                description, evidence_urls, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(complainant_id)
        .bind(request.booking_id)
        .bind(request.category)
        .bind(request.severity)
        .bind(&request.description)
        .bind(request.evidence_urls.unwrap_or_default())
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(
            complaint_id = %complaint.id,
            category = ?complaint.category,
            severity = ?complaint.severity,
            "Complaint filed"
        );

        Ok(complaint)
    }

    /// Get a complaint with its response thread. Non-admin viewers must be
    /// the complainant.
    pub async fn get_complaint(
        &self,
        id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> ApiResult<ComplaintWithThread> {
        let complaint = sqlx::query_as::<_, Complaint>("SELECT * FROM complaints WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Complaint not found".to_string()))?;

        if let Some(viewer) = viewer_id {
            if complaint.complainant_id != viewer {
                return Err(ApiError::NotFound("Complaint not found".to_string()));
            }
        }

        let responses = sqlx::query_as::<_, ComplaintResponse>(
            "SELECT * FROM complaint_responses WHERE complaint_id = $1 ORDER BY created_at ASC",
        )
        .bind(id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(ComplaintWithThread {
            complaint,
            responses,
        })
    }

    /// List complaints filed by one user
    pub async fn list_for_complainant(&self, complainant_id: Uuid) -> ApiResult<Vec<Complaint>> {
        let complaints = sqlx::query_as::<_, Complaint>(
            "SELECT * FROM complaints WHERE complainant_id = $1 ORDER BY created_at DESC",
        )
        .bind(complainant_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(complaints)
    }

    /// Admin list with filtering and pagination
    pub async fn list_complaints(&self, query: &ListComplaintsQuery) -> ApiResult<Vec<Complaint>> {
        let (_, limit, offset) = PaginationParams {
            page: query.page,
            limit: query.limit,
        }
        .normalize();

        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM complaints WHERE 1=1");

        if let Some(status) = query.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }
        if let Some(category) = query.category {
            query_builder.push(" AND category = ");
            query_builder.push_bind(category);
        }
        if let Some(severity) = query.severity {
            query_builder.push(" AND severity = ");
            query_builder.push_bind(severity);
        }

        query_builder.push(" ORDER BY created_at DESC LIMIT ");
        query_builder.push_bind(limit as i64);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset);

        let complaints = query_builder
            .build_query_as::<Complaint>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(complaints)
    }

    /// Add a response to a complaint's thread. The complainant can respond
    /// to their own complaint; admins can respond to any open one. The
    /// first admin response moves a pending complaint to investigating.
    pub async fn respond(
        &self,
        complaint_id: Uuid,
        responder_id: Uuid,
        responder_role: UserRole,
        body: &str,
    ) -> ApiResult<ComplaintResponse> {
        let complaint = sqlx::query_as::<_, Complaint>("SELECT * FROM complaints WHERE id = $1")
            .bind(complaint_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Complaint not found".to_string()))?;

        if responder_role != UserRole::Admin && complaint.complainant_id != responder_id {
            return Err(ApiError::NotFound("Complaint not found".to_string()));
        }

        if complaint.status.is_terminal() {
            return Err(ApiError::Conflict(
                "Complaint is closed and no longer accepts responses".to_string(),
            ));
        }

        let mut tx = self.db_pool.begin().await?;

        let response = sqlx::query_as::<_, ComplaintResponse>(
            r#"
            INSERT INTO complaint_responses (id, complaint_id, responder_id, responder_role, body, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(complaint_id)
        .bind(responder_id)
        .bind(responder_role)
        .bind(body)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        if responder_role == UserRole::Admin && complaint.status == ComplaintStatus::Pending {
            sqlx::query(
                "UPDATE complaints SET status = 'investigating', updated_at = $1 WHERE id = $2 AND status = 'pending'",
            )
            .bind(Utc::now())
            .bind(complaint_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(response)
    }

    /// Admin resolves a complaint with a resolution summary
    ///
    /// Resolution fields populate only here; every other status change
    /// leaves them null.
    pub async fn resolve(
        &self,
        complaint_id: Uuid,
        admin_id: Uuid,
        resolution: &str,
    ) -> ApiResult<Complaint> {
        let updated = sqlx::query_as::<_, Complaint>(
            r#"
            UPDATE complaints
            SET status = 'resolved', resolution = $1, resolved_by = $2, resolved_at = $3, updated_at = $3
            WHERE id = $4 AND status IN ('pending', 'investigating')
            RETURNING *
            "#,
        )
        .bind(resolution)
        .bind(admin_id)
        .bind(Utc::now())
        .bind(complaint_id)
        .fetch_optional(&self.db_pool)
        .await?;

        match updated {
            Some(complaint) => {
                tracing::info!(complaint_id = %complaint_id, "Complaint resolved");
                Ok(complaint)
            }
            None => self.status_conflict(complaint_id).await,
        }
    }

    /// Admin rejects a complaint without resolution
    pub async fn reject(&self, complaint_id: Uuid) -> ApiResult<Complaint> {
        let updated = sqlx::query_as::<_, Complaint>(
            r#"
            UPDATE complaints
            SET status = 'rejected', updated_at = $1
            WHERE id = $2 AND status IN ('pending', 'investigating')
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(complaint_id)
        .fetch_optional(&self.db_pool)
        .await?;

        match updated {
            Some(complaint) => {
                tracing::info!(complaint_id = %complaint_id, "Complaint rejected");
                Ok(complaint)
            }
            None => self.status_conflict(complaint_id).await,
        }
    }

    async fn status_conflict(&self, complaint_id: Uuid) -> ApiResult<Complaint> {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM complaints WHERE id = $1")
            .bind(complaint_id)
            .fetch_optional(&self.db_pool)
            .await?;

        if exists.is_some() {
            Err(ApiError::Conflict(
                "Complaint is already in a terminal state".to_string(),
            ))
        } else {
            Err(ApiError::NotFound("Complaint not found".to_string()))
        }
    }
}
