use crate::error::ApiResult;
use crate::lifecycle;
use crate::models::{
    Administrator, CreateIncomingMailRequest, DashboardStats, DocumentStatus, IncomingMail,
    UpdateIncomingMailRequest,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

/// Repository Trait
///
/// Abstract contract for all persistence operations, so handlers and the
/// auth service can run against Postgres in production and an in-memory
/// double in tests. `Send + Sync + async_trait` make the trait object
/// (`Arc<dyn Repository>`) shareable across Axum task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Incoming mail ---

    /// Inserts a new mail record. A duplicate registration number surfaces
    /// as a Conflict, leaving the store untouched.
    async fn create_mail(&self, input: CreateIncomingMailRequest) -> ApiResult<IncomingMail>;
    async fn get_mail(&self, id: i32) -> ApiResult<Option<IncomingMail>>;
    /// Every record, newest first.
    async fn list_mails(&self) -> ApiResult<Vec<IncomingMail>>;
    /// Newest first, truncated to `limit`.
    async fn recent_mails(&self, limit: i64) -> ApiResult<Vec<IncomingMail>>;
    /// Case-insensitive substring match on the sender name; an absent query
    /// degrades to a plain paginated listing. Ordering is deterministic so
    /// consecutive pages neither skip nor repeat rows.
    async fn search_mails(
        &self,
        sender_name: Option<String>,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<IncomingMail>>;
    /// Partial update through the lifecycle policy. Returns None when the id
    /// does not exist; no row is ever created here.
    async fn update_mail(
        &self,
        id: i32,
        changes: UpdateIncomingMailRequest,
    ) -> ApiResult<Option<IncomingMail>>;
    /// Returns whether a row was actually removed.
    async fn delete_mail(&self, id: i32) -> ApiResult<bool>;

    // --- Public tracking ---

    /// Restricted public projection by exact registration number.
    async fn track_mail(&self, registration_number: &str) -> ApiResult<Option<DocumentStatus>>;

    // --- Dashboard ---

    /// Counts computed at call time, never cached.
    async fn get_stats(&self) -> ApiResult<DashboardStats>;

    // --- Administrators ---

    async fn get_admin(&self, id: i32) -> ApiResult<Option<Administrator>>;
    /// Exact, case-sensitive username lookup.
    async fn get_admin_by_username(&self, username: &str) -> ApiResult<Option<Administrator>>;
    async fn count_admins(&self) -> ApiResult<i64>;
    /// Inserts an administrator; a duplicate username is a Conflict.
    async fn create_admin(&self, username: &str, password_hash: &str) -> ApiResult<Administrator>;
    /// Replaces the stored hash and restamps `updated_at`. Returns whether a
    /// row was updated.
    async fn set_admin_password(&self, id: i32, password_hash: &str) -> ApiResult<bool>;
}

/// Shared handle to the persistence layer inside the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The production implementation of `Repository`, backed by a PgPool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_mail(&self, input: CreateIncomingMailRequest) -> ApiResult<IncomingMail> {
        let mail = sqlx::query_as::<_, IncomingMail>(
            "INSERT INTO incoming_mails \
                (registration_number, sender_name, opd_name, letter_number, letter_subject, \
                 receiver_name, incoming_date, status, department, update_date, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING *",
        )
        .bind(&input.registration_number)
        .bind(&input.sender_name)
        .bind(&input.opd_name)
        .bind(&input.letter_number)
        .bind(&input.letter_subject)
        .bind(&input.receiver_name)
        .bind(input.incoming_date)
        .bind(input.status)
        .bind(input.department)
        .bind(input.update_date)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(mail)
    }

    async fn get_mail(&self, id: i32) -> ApiResult<Option<IncomingMail>> {
        let mail = sqlx::query_as::<_, IncomingMail>(
            "SELECT * FROM incoming_mails WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(mail)
    }

    async fn list_mails(&self) -> ApiResult<Vec<IncomingMail>> {
        let mails = sqlx::query_as::<_, IncomingMail>(
            "SELECT * FROM incoming_mails ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(mails)
    }

    async fn recent_mails(&self, limit: i64) -> ApiResult<Vec<IncomingMail>> {
        let mails = sqlx::query_as::<_, IncomingMail>(
            "SELECT * FROM incoming_mails ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(mails)
    }

    async fn search_mails(
        &self,
        sender_name: Option<String>,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<IncomingMail>> {
        // The id tiebreaker keeps pagination stable for rows created within
        // the same timestamp tick.
        let mails = match sender_name {
            Some(query) => {
                let pattern = format!("%{}%", query);
                sqlx::query_as::<_, IncomingMail>(
                    "SELECT * FROM incoming_mails WHERE sender_name ILIKE $1 \
                     ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
                )
                .bind(pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, IncomingMail>(
                    "SELECT * FROM incoming_mails \
                     ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(mails)
    }

    async fn update_mail(
        &self,
        id: i32,
        changes: UpdateIncomingMailRequest,
    ) -> ApiResult<Option<IncomingMail>> {
        // Read-modify-write: the merge (and the update_date stamping rules)
        // happen in the pure lifecycle policy, then the whole mutable field
        // set is written back.
        let Some(existing) = self.get_mail(id).await? else {
            return Ok(None);
        };

        let merged = lifecycle::apply_update(&existing, &changes, Utc::now());

        let updated = sqlx::query_as::<_, IncomingMail>(
            "UPDATE incoming_mails SET \
                registration_number = $2, sender_name = $3, opd_name = $4, \
                letter_number = $5, letter_subject = $6, receiver_name = $7, \
                incoming_date = $8, status = $9, department = $10, \
                update_date = $11, notes = $12, updated_at = $13 \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(&merged.registration_number)
        .bind(&merged.sender_name)
        .bind(&merged.opd_name)
        .bind(&merged.letter_number)
        .bind(&merged.letter_subject)
        .bind(&merged.receiver_name)
        .bind(merged.incoming_date)
        .bind(merged.status)
        .bind(merged.department)
        .bind(merged.update_date)
        .bind(&merged.notes)
        .bind(merged.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_mail(&self, id: i32) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM incoming_mails WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn track_mail(&self, registration_number: &str) -> ApiResult<Option<DocumentStatus>> {
        // The projection happens in SQL so internal columns never leave the
        // database for this query.
        let status = sqlx::query_as::<_, DocumentStatus>(
            "SELECT registration_number, \
                    status AS last_status, \
                    department AS handling_department, \
                    update_date AS last_update_date, \
                    notes AS progress_notes \
             FROM incoming_mails WHERE registration_number = $1",
        )
        .bind(registration_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(status)
    }

    async fn get_stats(&self) -> ApiResult<DashboardStats> {
        // One pass over the table keeps the three counts mutually consistent.
        let stats = sqlx::query_as::<_, DashboardStats>(
            "SELECT COUNT(*) AS total_mails, \
                    COUNT(*) FILTER (WHERE status = 'Diproses') AS processed_mails, \
                    COUNT(*) FILTER (WHERE status = 'Selesai') AS completed_mails \
             FROM incoming_mails",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn get_admin(&self, id: i32) -> ApiResult<Option<Administrator>> {
        let admin = sqlx::query_as::<_, Administrator>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn get_admin_by_username(&self, username: &str) -> ApiResult<Option<Administrator>> {
        let admin =
            sqlx::query_as::<_, Administrator>("SELECT * FROM admins WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(admin)
    }

    async fn count_admins(&self) -> ApiResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_admin(&self, username: &str, password_hash: &str) -> ApiResult<Administrator> {
        let admin = sqlx::query_as::<_, Administrator>(
            "INSERT INTO admins (username, password_hash) VALUES ($1, $2) RETURNING *",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn set_admin_password(&self, id: i32, password_hash: &str) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE admins SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
