use async_trait::async_trait;
use chrono::Utc;
use emot::{
    ApiError, auth,
    config::AppConfig,
    models::{
        Administrator, ChangePasswordRequest, CreateIncomingMailRequest, DashboardStats,
        DocumentStatus, IncomingMail, LoginRequest, RegisterAdminRequest,
        UpdateIncomingMailRequest,
    },
    repository::{Repository, RepositoryState},
};
use std::sync::{Arc, Mutex};
use validator::Validate;

// --- ADMIN STORE DOUBLE ---

// Only the administrator side matters for these tests; the mail operations
// return empty defaults.
#[derive(Default)]
struct AdminStore {
    admins: Mutex<Vec<Administrator>>,
}

impl AdminStore {
    fn with_admin(username: &str, password: &str) -> Self {
        let store = AdminStore::default();
        let now = Utc::now();
        store.admins.lock().unwrap().push(Administrator {
            id: 1,
            username: username.to_string(),
            password_hash: auth::hash_password(password).unwrap(),
            created_at: now,
            updated_at: now,
        });
        store
    }
}

#[async_trait]
impl Repository for AdminStore {
    async fn create_mail(
        &self,
        _input: CreateIncomingMailRequest,
    ) -> Result<IncomingMail, ApiError> {
        Ok(IncomingMail::default())
    }
    async fn get_mail(&self, _id: i32) -> Result<Option<IncomingMail>, ApiError> {
        Ok(None)
    }
    async fn list_mails(&self) -> Result<Vec<IncomingMail>, ApiError> {
        Ok(vec![])
    }
    async fn recent_mails(&self, _limit: i64) -> Result<Vec<IncomingMail>, ApiError> {
        Ok(vec![])
    }
    async fn search_mails(
        &self,
        _sender_name: Option<String>,
        _limit: i64,
        _offset: i64,
    ) -> Result<Vec<IncomingMail>, ApiError> {
        Ok(vec![])
    }
    async fn update_mail(
        &self,
        _id: i32,
        _changes: UpdateIncomingMailRequest,
    ) -> Result<Option<IncomingMail>, ApiError> {
        Ok(None)
    }
    async fn delete_mail(&self, _id: i32) -> Result<bool, ApiError> {
        Ok(false)
    }
    async fn track_mail(
        &self,
        _registration_number: &str,
    ) -> Result<Option<DocumentStatus>, ApiError> {
        Ok(None)
    }
    async fn get_stats(&self) -> Result<DashboardStats, ApiError> {
        Ok(DashboardStats::default())
    }

    async fn get_admin(&self, id: i32) -> Result<Option<Administrator>, ApiError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn get_admin_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Administrator>, ApiError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn count_admins(&self) -> Result<i64, ApiError> {
        Ok(self.admins.lock().unwrap().len() as i64)
    }

    async fn create_admin(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Administrator, ApiError> {
        let mut admins = self.admins.lock().unwrap();
        if admins.iter().any(|a| a.username == username) {
            return Err(ApiError::Conflict("unique key already in use".to_string()));
        }
        let now = Utc::now();
        let admin = Administrator {
            id: admins.iter().map(|a| a.id).max().unwrap_or(0) + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        admins.push(admin.clone());
        Ok(admin)
    }

    async fn set_admin_password(&self, id: i32, password_hash: &str) -> Result<bool, ApiError> {
        let mut admins = self.admins.lock().unwrap();
        match admins.iter_mut().find(|a| a.id == id) {
            Some(admin) => {
                admin.password_hash = password_hash.to_string();
                admin.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn repo_with_admin() -> RepositoryState {
    Arc::new(AdminStore::with_admin("admin", "admin123"))
}

// --- PASSWORD HASHING ---

#[test]
fn hash_verify_round_trip() {
    let hash = auth::hash_password("hunter-s42").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(auth::verify_password("hunter-s42", &hash));
    assert!(!auth::verify_password("hunter-s43", &hash));
}

#[test]
fn same_password_hashes_differently() {
    let first = auth::hash_password("repeatable").unwrap();
    let second = auth::hash_password("repeatable").unwrap();
    // Fresh salt each time.
    assert_ne!(first, second);
}

#[test]
fn garbage_stored_hash_never_verifies() {
    assert!(!auth::verify_password("anything", "not-a-phc-string"));
    assert!(!auth::verify_password("anything", ""));
}

// --- LOGIN ---

#[tokio::test]
async fn login_succeeds_and_token_decodes() {
    let repo = repo_with_admin();
    let config = AppConfig::default();

    let response = auth::login(
        &repo,
        &config,
        &LoginRequest {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(response.admin.id, 1);
    assert_eq!(response.admin.username, "admin");

    let decoded = jsonwebtoken::decode::<auth::Claims>(
        &response.token,
        &jsonwebtoken::DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )
    .unwrap();
    assert_eq!(decoded.claims.sub, 1);
}

#[tokio::test]
async fn login_failure_is_uniform() {
    let repo = repo_with_admin();
    let config = AppConfig::default();

    let unknown_user = auth::login(
        &repo,
        &config,
        &LoginRequest {
            username: "nobody".to_string(),
            password: "admin123".to_string(),
        },
    )
    .await;
    let wrong_password = auth::login(
        &repo,
        &config,
        &LoginRequest {
            username: "admin".to_string(),
            password: "wrong".to_string(),
        },
    )
    .await;

    // Same failure signal either way.
    assert!(matches!(unknown_user.unwrap_err(), ApiError::Auth));
    assert!(matches!(wrong_password.unwrap_err(), ApiError::Auth));
}

#[tokio::test]
async fn login_username_is_case_sensitive() {
    let repo = repo_with_admin();
    let config = AppConfig::default();

    let result = auth::login(
        &repo,
        &config,
        &LoginRequest {
            username: "Admin".to_string(),
            password: "admin123".to_string(),
        },
    )
    .await;

    assert!(matches!(result.unwrap_err(), ApiError::Auth));
}

// --- PASSWORD CHANGE ---

#[tokio::test]
async fn change_password_rotates_credential() {
    let repo = repo_with_admin();

    let changed = auth::change_password(
        &repo,
        1,
        &ChangePasswordRequest {
            current_password: "admin123".to_string(),
            new_password: "stronger-pass".to_string(),
        },
    )
    .await
    .unwrap();
    assert!(changed);

    let admin = repo.get_admin(1).await.unwrap().unwrap();
    assert!(auth::verify_password("stronger-pass", &admin.password_hash));
    assert!(!auth::verify_password("admin123", &admin.password_hash));
}

#[tokio::test]
async fn change_password_wrong_current_writes_nothing() {
    let repo = repo_with_admin();
    let before = repo.get_admin(1).await.unwrap().unwrap().password_hash;

    let changed = auth::change_password(
        &repo,
        1,
        &ChangePasswordRequest {
            current_password: "not-the-password".to_string(),
            new_password: "stronger-pass".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(!changed);
    let after = repo.get_admin(1).await.unwrap().unwrap().password_hash;
    assert_eq!(before, after);
}

#[tokio::test]
async fn change_password_missing_admin_fails() {
    let repo = repo_with_admin();

    let changed = auth::change_password(
        &repo,
        99,
        &ChangePasswordRequest {
            current_password: "admin123".to_string(),
            new_password: "stronger-pass".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(!changed);
}

#[test]
fn new_password_minimum_length_enforced_at_boundary() {
    let too_short = ChangePasswordRequest {
        current_password: "admin123".to_string(),
        new_password: "abc".to_string(),
    };
    assert!(too_short.validate().is_err());

    let just_long_enough = ChangePasswordRequest {
        current_password: "admin123".to_string(),
        new_password: "abcdef".to_string(),
    };
    assert!(just_long_enough.validate().is_ok());
}

// --- SEEDING & REGISTRATION ---

#[tokio::test]
async fn seeding_is_idempotent() {
    let repo: RepositoryState = Arc::new(AdminStore::default());

    let first = auth::seed_default_admin(&repo).await.unwrap();
    let second = auth::seed_default_admin(&repo).await.unwrap();

    assert!(first);
    assert!(!second);
    assert_eq!(repo.count_admins().await.unwrap(), 1);

    // The seeded credential actually works.
    let admin = repo
        .get_admin_by_username(auth::DEFAULT_ADMIN_USERNAME)
        .await
        .unwrap()
        .unwrap();
    assert!(auth::verify_password(
        auth::DEFAULT_ADMIN_PASSWORD,
        &admin.password_hash
    ));
}

#[tokio::test]
async fn register_admin_rejects_taken_username() {
    let repo = repo_with_admin();

    let result = auth::register_admin(
        &repo,
        &RegisterAdminRequest {
            username: "admin".to_string(),
            password: "whatever6".to_string(),
        },
    )
    .await;

    assert!(matches!(result.unwrap_err(), ApiError::Conflict(_)));
    assert_eq!(repo.count_admins().await.unwrap(), 1);
}

#[tokio::test]
async fn register_admin_creates_working_credential() {
    let repo = repo_with_admin();

    let admin = auth::register_admin(
        &repo,
        &RegisterAdminRequest {
            username: "operator2".to_string(),
            password: "letmein6".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(admin.username, "operator2");
    let stored = repo.get_admin(admin.id).await.unwrap().unwrap();
    assert!(auth::verify_password("letmein6", &stored.password_hash));
}
