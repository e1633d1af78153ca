use spacegate_core::types::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::auth::User;
use crate::error::{ApiError, ApiResult};

/// Session token -> user session data
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
    pub expires_at: Instant,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Seconds until expiry, rounded down
    pub fn expires_in(&self) -> u64 {
        self.expires_at
            .saturating_duration_since(Instant::now())
            .as_secs()
    }
}

/// Manages active user sessions
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn create_session(&self, user: &User) -> Session {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user.id.clone(),
            username: user.username.clone(),
            expires_at: Instant::now() + self.ttl,
        };

        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        debug!(user_id = %user.id, "session created");

        session
    }

    pub async fn get_session(&self, token: &str) -> ApiResult<Session> {
        let session = self
            .sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(ApiError::InvalidSession)?;

        if session.is_expired() {
            self.sessions.write().await.remove(token);
            return Err(ApiError::InvalidSession);
        }

        Ok(session)
    }

    pub async fn remove_session(&self, token: &str) -> ApiResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    /// Drop expired sessions; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        before - sessions.len()
    }
}
