use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    error::{ApiError, ApiResult},
    models::{Administrator, ChangePasswordRequest, LoginRequest, LoginResponse, RegisterAdminRequest},
    repository::RepositoryState,
};

/// Bootstrap credentials used when the store has no administrator yet.
/// Meant to be rotated through the password-change endpoint on first login.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Token lifetime. Operators re-login once a shift.
const TOKEN_TTL_HOURS: i64 = 8;

// --- Password hashing ---

/// Hashes a password into an Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC hash. The underlying comparison
/// is constant-time, so the result carries no timing signal about how close
/// the guess was. Any failure (bad hash, mismatch) is a plain `false`.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// --- Tokens ---

/// Claims
///
/// Payload of the bearer token issued at login and validated on every
/// privileged request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The administrator id.
    pub sub: i32,
    /// Expiry timestamp; tokens outlive a work shift and no more.
    pub exp: usize,
    /// Issued-at timestamp.
    pub iat: usize,
}

/// Signs a token for the given administrator.
pub fn issue_token(admin_id: i32, secret: &str) -> ApiResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: admin_id,
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// AuthAdmin
///
/// The resolved identity of an authenticated administrator request.
/// Handlers take this as an argument wherever the operator's identity
/// matters; the admin route group is additionally gated by a middleware
/// layer built on this extractor.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub id: i32,
    pub username: String,
}

/// AuthAdmin Extractor Implementation
///
/// Resolution order:
/// 1. Local-only bypass: an `x-admin-id` header naming an existing admin,
///    for development and tests. Never active in Production.
/// 2. Bearer token: decode and validate the JWT, then confirm the admin
///    still exists in the store (a deleted operator's token is dead).
///
/// Every failure is the same uniform 401 signal.
impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(header_value) = parts.headers.get("x-admin-id") {
                if let Ok(admin_id) = header_value
                    .to_str()
                    .unwrap_or_default()
                    .parse::<i32>()
                {
                    if let Some(admin) = repo.get_admin(admin_id).await? {
                        return Ok(AuthAdmin {
                            id: admin.id,
                            username: admin.username,
                        });
                    }
                }
            }
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Auth)?;
        let token = auth_header.strip_prefix("Bearer ").ok_or(ApiError::Auth)?;

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| ApiError::Auth)?;

        let admin = repo
            .get_admin(token_data.claims.sub)
            .await?
            .ok_or(ApiError::Auth)?;

        Ok(AuthAdmin {
            id: admin.id,
            username: admin.username,
        })
    }
}

// --- Services ---

/// Verifies credentials and issues a bearer token.
///
/// Unknown username and wrong password produce the identical `ApiError::Auth`
/// signal; the hash comparison itself is constant-time.
pub async fn login(repo: &RepositoryState, config: &AppConfig, input: &LoginRequest) -> ApiResult<LoginResponse> {
    let admin = repo
        .get_admin_by_username(&input.username)
        .await?
        .ok_or(ApiError::Auth)?;

    if !verify_password(&input.password, &admin.password_hash) {
        return Err(ApiError::Auth);
    }

    let token = issue_token(admin.id, &config.jwt_secret)?;
    Ok(LoginResponse { token, admin })
}

/// Changes an administrator's password after re-verifying the current one.
/// On any mismatch nothing is written. Length constraints are enforced at
/// the boundary before this service runs.
pub async fn change_password(
    repo: &RepositoryState,
    admin_id: i32,
    input: &ChangePasswordRequest,
) -> ApiResult<bool> {
    let Some(admin) = repo.get_admin(admin_id).await? else {
        return Ok(false);
    };

    if !verify_password(&input.current_password, &admin.password_hash) {
        return Ok(false);
    }

    let new_hash = hash_password(&input.new_password)?;
    repo.set_admin_password(admin_id, &new_hash).await
}

/// Registers an additional administrator. A taken username is a Conflict.
pub async fn register_admin(
    repo: &RepositoryState,
    input: &RegisterAdminRequest,
) -> ApiResult<Administrator> {
    if repo.get_admin_by_username(&input.username).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "username '{}' already registered",
            input.username
        )));
    }
    let password_hash = hash_password(&input.password)?;
    repo.create_admin(&input.username, &password_hash).await
}

/// Idempotent bootstrap: creates the default administrator only when the
/// store has none. Returns whether a record was created. A concurrent seed
/// losing the race on the username constraint is treated as already seeded.
pub async fn seed_default_admin(repo: &RepositoryState) -> ApiResult<bool> {
    if repo.count_admins().await? > 0 {
        return Ok(false);
    }

    let password_hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
    match repo.create_admin(DEFAULT_ADMIN_USERNAME, &password_hash).await {
        Ok(_) => Ok(true),
        Err(ApiError::Conflict(_)) => Ok(false),
        Err(e) => Err(e),
    }
}
