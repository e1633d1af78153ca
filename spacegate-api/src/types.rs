//! Request/response bodies of the auth endpoints

use serde::{Deserialize, Serialize};

use crate::session::Session;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: SessionUser,
    pub expires_in: u64,
}

impl SessionResponse {
    pub fn new(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            user: SessionUser {
                id: session.user_id.to_string(),
                username: session.username.clone(),
            },
            expires_in: session.expires_in(),
        }
    }
}

/// `?q=<json>` on gateway reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadQuery {
    pub q: Option<String>,
}
