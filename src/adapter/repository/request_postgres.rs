use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::request::{BlotterRequest, ClearanceRequest, RequestStatus};
use crate::domain::repository::RequestRepository;

const CLEARANCE_COLUMNS: &str =
    "id, user_id, fullname, address, purpose, message, status, created_at, updated_at";

const BLOTTER_COLUMNS: &str = "id, user_id, complainant, respondent, complaint, incident_type, \
    status, date_time_reported, date_time_incident, date_recorded, created_at, updated_at";

/// ClearanceRequestPostgresRepository は PostgreSQL 実装のクリアランス申請リポジトリ。
pub struct ClearanceRequestPostgresRepository {
    pool: PgPool,
}

impl ClearanceRequestPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository<ClearanceRequest> for ClearanceRequestPostgresRepository {
    async fn create(&self, request: &ClearanceRequest) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clearance_requests
                (id, user_id, fullname, address, purpose, message, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(&request.fullname)
        .bind(&request.address)
        .bind(&request.purpose)
        .bind(&request.message)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<ClearanceRequest>> {
        let rows: Vec<ClearanceRow> = sqlx::query_as(&format!(
            "SELECT {CLEARANCE_COLUMNS} FROM clearance_requests ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ClearanceRequest>> {
        let rows: Vec<ClearanceRow> = sqlx::query_as(&format!(
            "SELECT {CLEARANCE_COLUMNS} FROM clearance_requests \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> anyhow::Result<Option<ClearanceRequest>> {
        let row: Option<ClearanceRow> = sqlx::query_as(&format!(
            "UPDATE clearance_requests SET status = $2, updated_at = $3 \
             WHERE id = $1 RETURNING {CLEARANCE_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM clearance_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// BlotterRequestPostgresRepository は PostgreSQL 実装のブロッター申請リポジトリ。
pub struct BlotterRequestPostgresRepository {
    pool: PgPool,
}

impl BlotterRequestPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository<BlotterRequest> for BlotterRequestPostgresRepository {
    async fn create(&self, request: &BlotterRequest) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO blotter_requests
                (id, user_id, complainant, respondent, complaint, incident_type, status,
                 date_time_reported, date_time_incident, date_recorded, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(&request.complainant)
        .bind(&request.respondent)
        .bind(&request.complaint)
        .bind(&request.incident_type)
        .bind(request.status.as_str())
        .bind(request.date_time_reported)
        .bind(request.date_time_incident)
        .bind(request.date_recorded)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<BlotterRequest>> {
        let rows: Vec<BlotterRow> = sqlx::query_as(&format!(
            "SELECT {BLOTTER_COLUMNS} FROM blotter_requests ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<BlotterRequest>> {
        let rows: Vec<BlotterRow> = sqlx::query_as(&format!(
            "SELECT {BLOTTER_COLUMNS} FROM blotter_requests \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> anyhow::Result<Option<BlotterRequest>> {
        let row: Option<BlotterRow> = sqlx::query_as(&format!(
            "UPDATE blotter_requests SET status = $2, updated_at = $3 \
             WHERE id = $1 RETURNING {BLOTTER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM blotter_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct ClearanceRow {
    id: Uuid,
    user_id: Uuid,
    fullname: String,
    address: String,
    purpose: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClearanceRow> for ClearanceRequest {
    type Error = anyhow::Error;

    fn try_from(row: ClearanceRow) -> anyhow::Result<Self> {
        Ok(ClearanceRequest {
            id: row.id,
            user_id: row.user_id,
            fullname: row.fullname,
            address: row.address,
            purpose: row.purpose,
            message: row.message,
            status: row.status.parse().map_err(anyhow::Error::msg)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BlotterRow {
    id: Uuid,
    user_id: Uuid,
    complainant: String,
    respondent: String,
    complaint: String,
    incident_type: String,
    status: String,
    date_time_reported: DateTime<Utc>,
    date_time_incident: DateTime<Utc>,
    date_recorded: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlotterRow> for BlotterRequest {
    type Error = anyhow::Error;

    fn try_from(row: BlotterRow) -> anyhow::Result<Self> {
        Ok(BlotterRequest {
            id: row.id,
            user_id: row.user_id,
            complainant: row.complainant,
            respondent: row.respondent,
            complaint: row.complaint,
            incident_type: row.incident_type,
            status: row.status.parse().map_err(anyhow::Error::msg)?,
            date_time_reported: row.date_time_reported,
            date_time_incident: row.date_time_incident,
            date_recorded: row.date_recorded,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
