use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

// --- Closed Enumerations ---

/// LetterStatus
///
/// Lifecycle stage of a registered letter. The wire and database labels are the
/// Indonesian ones used by the registration desk client, so invalid values are
/// rejected at deserialization time rather than surfacing as bad rows later.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "letter_status")]
#[ts(export)]
pub enum LetterStatus {
    #[default]
    #[serde(rename = "Diterima")]
    #[sqlx(rename = "Diterima")]
    Received,
    #[serde(rename = "Diproses")]
    #[sqlx(rename = "Diproses")]
    InProgress,
    #[serde(rename = "Selesai")]
    #[sqlx(rename = "Selesai")]
    Completed,
    #[serde(rename = "Ditolak")]
    #[sqlx(rename = "Ditolak")]
    Rejected,
}

/// Department
///
/// The internal unit a letter is routed to for handling. Closed set, same
/// label convention as `LetterStatus`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "department")]
#[ts(export)]
pub enum Department {
    #[default]
    #[serde(rename = "Bidang Mutasi")]
    #[sqlx(rename = "Bidang Mutasi")]
    Mutation,
    #[serde(rename = "Bidang Kepegawaian")]
    #[sqlx(rename = "Bidang Kepegawaian")]
    Personnel,
    #[serde(rename = "Bidang Pengembangan")]
    #[sqlx(rename = "Bidang Pengembangan")]
    Development,
    #[serde(rename = "Bidang Administrasi")]
    #[sqlx(rename = "Bidang Administrasi")]
    Administration,
}

// --- Core Application Schemas (Mapped to Database) ---

/// Administrator
///
/// Back-office operator record from the `admins` table. The password hash is
/// never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Administrator {
    pub id: i32,
    pub username: String,
    /// Argon2id PHC string. Internal only.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    #[schema(ignore)]
    pub password_hash: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// IncomingMail
///
/// One registered piece of official mail from the `incoming_mails` table.
/// `registration_number` is the unique public lookup key.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct IncomingMail {
    pub id: i32,
    pub registration_number: String,
    pub sender_name: String,
    /// Originating agency (OPD) that sent the letter.
    pub opd_name: String,
    pub letter_number: String,
    pub letter_subject: String,
    pub receiver_name: String,
    #[ts(type = "string")]
    pub incoming_date: DateTime<Utc>,
    pub status: LetterStatus,
    pub department: Department,
    /// Stamped whenever the status is touched; null until the first progress
    /// update. See the lifecycle module for the exact stamping rules.
    #[ts(type = "string | null")]
    pub update_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateIncomingMailRequest
///
/// Input payload for registering a new letter (POST /admin/mails).
/// Required fields are non-empty; enum fields are validated by construction.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateIncomingMailRequest {
    #[validate(length(min = 1))]
    pub registration_number: String,
    #[validate(length(min = 1))]
    pub sender_name: String,
    #[validate(length(min = 1))]
    pub opd_name: String,
    #[validate(length(min = 1))]
    pub letter_number: String,
    #[validate(length(min = 1))]
    pub letter_subject: String,
    #[validate(length(min = 1))]
    pub receiver_name: String,
    #[ts(type = "string")]
    pub incoming_date: DateTime<Utc>,
    pub status: LetterStatus,
    pub department: Department,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub update_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Deserializes a field that was present in the JSON body, keeping the
/// distinction between "absent" (outer None) and "explicit null" (Some(None)).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// UpdateIncomingMailRequest
///
/// Partial update payload (PUT /admin/mails/{id}). Absent fields keep their
/// stored value. `update_date` and `notes` are nullable columns, so they use a
/// double `Option`: the outer layer records whether the caller supplied the
/// field at all, the inner layer carries an explicit null. This distinction
/// drives the lifecycle stamping rules.
#[derive(Debug, Clone, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateIncomingMailRequest {
    #[validate(length(min = 1))]
    pub registration_number: Option<String>,
    #[validate(length(min = 1))]
    pub sender_name: Option<String>,
    #[validate(length(min = 1))]
    pub opd_name: Option<String>,
    #[validate(length(min = 1))]
    pub letter_number: Option<String>,
    #[validate(length(min = 1))]
    pub letter_subject: Option<String>,
    #[validate(length(min = 1))]
    pub receiver_name: Option<String>,
    #[ts(type = "string | null")]
    pub incoming_date: Option<DateTime<Utc>>,
    pub status: Option<LetterStatus>,
    pub department: Option<Department>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(type = "string | null")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub update_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(type = "string | null")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

// --- Public Tracking ---

/// DocumentStatus
///
/// Restricted public projection of a mail record, keyed by registration
/// number. Deliberately excludes internal fields (id, sender, receiver,
/// timestamps) so the anonymous tracking page leaks nothing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct DocumentStatus {
    pub registration_number: String,
    pub last_status: LetterStatus,
    pub handling_department: Department,
    #[ts(type = "string | null")]
    pub last_update_date: Option<DateTime<Utc>>,
    pub progress_notes: Option<String>,
}

// --- Dashboard ---

/// DashboardStats
///
/// Counts for the admin dashboard cards, computed at call time.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct DashboardStats {
    pub total_mails: i64,
    /// Mails currently in progress (status Diproses).
    pub processed_mails: i64,
    /// Mails marked completed (status Selesai).
    pub completed_mails: i64,
}

// --- Auth Payloads ---

/// LoginRequest
///
/// Credentials for POST /auth/login. Username matching is exact and
/// case-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// LoginResponse
///
/// Issued on successful login: a signed bearer token plus the administrator
/// record (hash omitted). The token must accompany every privileged call.
#[derive(Debug, Clone, Serialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub admin: Administrator,
}

/// ChangePasswordRequest
///
/// Payload for POST /admin/password. The minimum length is checked here at
/// the boundary, before any hashing work happens.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// RegisterAdminRequest
///
/// Payload for POST /admin/register (creating an additional operator).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct RegisterAdminRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
}

// --- Query Parameters ---

/// RecentMailsQuery
///
/// Query parameters for GET /admin/mails/recent.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::IntoParams)]
pub struct RecentMailsQuery {
    /// Maximum number of rows to return, newest first. Defaults to 10.
    #[validate(range(min = 1))]
    pub limit: Option<i64>,
}

/// SearchMailsQuery
///
/// Query parameters for GET /admin/mails/search. An absent `sender_name`
/// degrades to a plain paginated listing.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::IntoParams)]
pub struct SearchMailsQuery {
    /// Case-insensitive substring match against the sender name.
    pub sender_name: Option<String>,
    #[validate(range(min = 1))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}
