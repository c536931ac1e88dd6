use crate::{
    AppState, auth,
    auth::AuthAdmin,
    error::{ApiError, ApiResult},
    models::{
        Administrator, ChangePasswordRequest, CreateIncomingMailRequest, DashboardStats,
        DocumentStatus, IncomingMail, LoginRequest, LoginResponse, RecentMailsQuery,
        RegisterAdminRequest, SearchMailsQuery, UpdateIncomingMailRequest,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

const DEFAULT_PAGE_SIZE: i64 = 10;

// --- Public Handlers ---

/// track_document
///
/// [Public Route] Looks up a letter by its exact registration number and
/// returns the restricted tracking projection. Internal fields (ids, names,
/// timestamps) never appear in this response.
#[utoipa::path(
    get,
    path = "/track/{registration_number}",
    params(("registration_number" = String, Path, description = "Public registration number")),
    responses(
        (status = 200, description = "Tracking status", body = DocumentStatus),
        (status = 404, description = "Unknown registration number")
    )
)]
pub async fn track_document(
    State(state): State<AppState>,
    Path(registration_number): Path<String>,
) -> ApiResult<Json<DocumentStatus>> {
    let status = state
        .repo
        .track_mail(&registration_number)
        .await?
        .ok_or(ApiError::NotFound("document"))?;
    Ok(Json(status))
}

/// admin_login
///
/// [Public Route] Verifies credentials and issues a bearer token. Unknown
/// username and wrong password are indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    payload.validate()?;
    let response = auth::login(&state.repo, &state.config, &payload).await?;
    Ok(Json(response))
}

// --- Admin Handlers ---

/// change_password
///
/// [Admin Route] Rotates the authenticated operator's password. The current
/// password is re-verified first; a mismatch writes nothing and yields the
/// uniform auth failure.
#[utoipa::path(
    post,
    path = "/admin/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = bool),
        (status = 401, description = "Current password rejected"),
        (status = 422, description = "New password too short")
    )
)]
pub async fn change_password(
    AuthAdmin { id, .. }: AuthAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<bool>> {
    payload.validate()?;
    if auth::change_password(&state.repo, id, &payload).await? {
        Ok(Json(true))
    } else {
        Err(ApiError::Auth)
    }
}

/// register_admin
///
/// [Admin Route] Creates an additional administrator account.
#[utoipa::path(
    post,
    path = "/admin/register",
    request_body = RegisterAdminRequest,
    responses(
        (status = 200, description = "Administrator created", body = Administrator),
        (status = 409, description = "Username already registered")
    )
)]
pub async fn register_admin(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAdminRequest>,
) -> ApiResult<Json<Administrator>> {
    payload.validate()?;
    let admin = auth::register_admin(&state.repo, &payload).await?;
    Ok(Json(admin))
}

/// get_dashboard_stats
///
/// [Admin Route] Live counts for the dashboard cards.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Dashboard counts", body = DashboardStats))
)]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.repo.get_stats().await?))
}

/// get_all_mails
///
/// [Admin Route] Every registered letter, newest first. No pagination.
#[utoipa::path(
    get,
    path = "/admin/mails",
    responses((status = 200, description = "All mails", body = [IncomingMail]))
)]
pub async fn get_all_mails(State(state): State<AppState>) -> ApiResult<Json<Vec<IncomingMail>>> {
    Ok(Json(state.repo.list_mails().await?))
}

/// get_recent_mails
///
/// [Admin Route] The newest letters, truncated to `limit` (default 10).
#[utoipa::path(
    get,
    path = "/admin/mails/recent",
    params(RecentMailsQuery),
    responses((status = 200, description = "Recent mails", body = [IncomingMail]))
)]
pub async fn get_recent_mails(
    State(state): State<AppState>,
    Query(query): Query<RecentMailsQuery>,
) -> ApiResult<Json<Vec<IncomingMail>>> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    Ok(Json(state.repo.recent_mails(limit).await?))
}

/// search_mails
///
/// [Admin Route] Paginated sender search; with no `sender_name` this is a
/// plain paginated listing.
#[utoipa::path(
    get,
    path = "/admin/mails/search",
    params(SearchMailsQuery),
    responses((status = 200, description = "Matching mails", body = [IncomingMail]))
)]
pub async fn search_mails(
    State(state): State<AppState>,
    Query(query): Query<SearchMailsQuery>,
) -> ApiResult<Json<Vec<IncomingMail>>> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    // An empty search string behaves like an absent one.
    let sender = query.sender_name.filter(|s| !s.is_empty());
    Ok(Json(state.repo.search_mails(sender, limit, offset).await?))
}

/// get_mail_by_id
///
/// [Admin Route] Single letter lookup.
#[utoipa::path(
    get,
    path = "/admin/mails/{id}",
    params(("id" = i32, Path, description = "Mail ID")),
    responses(
        (status = 200, description = "Found", body = IncomingMail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_mail_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<IncomingMail>> {
    let mail = state
        .repo
        .get_mail(id)
        .await?
        .ok_or(ApiError::NotFound("mail"))?;
    Ok(Json(mail))
}

/// create_incoming_mail
///
/// [Admin Route] Registers a new letter. A duplicate registration number is
/// a 409 Conflict and leaves the store unchanged.
#[utoipa::path(
    post,
    path = "/admin/mails",
    request_body = CreateIncomingMailRequest,
    responses(
        (status = 200, description = "Created", body = IncomingMail),
        (status = 409, description = "Registration number already used"),
        (status = 422, description = "Missing or empty required field")
    )
)]
pub async fn create_incoming_mail(
    State(state): State<AppState>,
    Json(payload): Json<CreateIncomingMailRequest>,
) -> ApiResult<Json<IncomingMail>> {
    payload.validate()?;
    let mail = state.repo.create_mail(payload).await?;
    Ok(Json(mail))
}

/// update_incoming_mail
///
/// [Admin Route] Partial update of a letter. Only supplied fields change;
/// the lifecycle policy decides how `update_date` is stamped.
#[utoipa::path(
    put,
    path = "/admin/mails/{id}",
    params(("id" = i32, Path, description = "Mail ID")),
    request_body = UpdateIncomingMailRequest,
    responses(
        (status = 200, description = "Updated", body = IncomingMail),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Registration number already used")
    )
)]
pub async fn update_incoming_mail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateIncomingMailRequest>,
) -> ApiResult<Json<IncomingMail>> {
    payload.validate()?;
    let mail = state
        .repo
        .update_mail(id, payload)
        .await?
        .ok_or(ApiError::NotFound("mail"))?;
    Ok(Json(mail))
}

/// delete_mail
///
/// [Admin Route] Removes a letter. Deleting an unknown id is a 404, not a
/// fault, and never touches other records.
#[utoipa::path(
    delete,
    path = "/admin/mails/{id}",
    params(("id" = i32, Path, description = "Mail ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_mail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    if state.repo.delete_mail(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("mail"))
    }
}
