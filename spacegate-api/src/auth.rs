use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use spacegate_core::core_space::DataError;
use spacegate_core::types::{Timestamp, UserId};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 32;
const PASSWORD_MIN_LEN: usize = 8;

/// A registered user, without credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: Timestamp,
}

/// Username/password accounts stored next to the Spaces
#[derive(Clone)]
pub struct UserStore {
    pool: Pool<SqliteConnectionManager>,
}

impl UserStore {
    /// The pool must already carry the migrated schema
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, username: &str, password: &str) -> ApiResult<User> {
        validate_credentials(username, password)?;

        let pool = self.pool.clone();
        let username = username.to_string();
        let password = password.to_string();

        let user = tokio::task::spawn_blocking(move || -> ApiResult<User> {
            let salt = SaltString::generate(&mut OsRng);
            let password_hash = Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| ApiError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?
                .to_string();

            let user = User {
                id: UserId::generate(),
                username,
                created_at: Timestamp::now(),
            };

            let conn = pool.get().map_err(DataError::from)?;
            conn.execute(
                "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
                params![
                    user.id.as_str(),
                    &user.username,
                    &password_hash,
                    user.created_at.as_millis() as i64,
                ],
            )
            .map_err(|e| match DataError::from(e) {
                err if err.is_uniqueness() => ApiError::UsernameTaken,
                err => ApiError::Data(err),
            })?;

            Ok(user)
        })
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Signup task failed: {}", e)))??;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    pub async fn verify(&self, username: &str, password: &str) -> ApiResult<User> {
        let pool = self.pool.clone();
        let username = username.to_string();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || -> ApiResult<User> {
            let conn = pool.get().map_err(DataError::from)?;
            let row = conn
                .query_row(
                    "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
                    params![&username],
                    |row| {
                        Ok((
                            User {
                                id: UserId::new(row.get::<_, String>(0)?),
                                username: row.get(1)?,
                                created_at: Timestamp::from_millis(row.get::<_, i64>(3)?.max(0) as u64),
                            },
                            row.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()
                .map_err(DataError::from)?;

            let (user, password_hash) = row.ok_or_else(|| {
                debug!(%username, "login for unknown user");
                ApiError::AuthenticationFailed("Invalid username or password".to_string())
            })?;

            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid password hash: {}", e)))?;

            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .map_err(|_| {
                    ApiError::AuthenticationFailed("Invalid username or password".to_string())
                })?;

            Ok(user)
        })
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Login task failed: {}", e)))?
    }
}

fn validate_credentials(username: &str, password: &str) -> ApiResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(ApiError::BadRequest(format!(
            "Username must be {}-{} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::BadRequest(
            "Username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}
