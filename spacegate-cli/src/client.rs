//! HTTP client for the SpaceGate API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use spacegate_core::core_space::Space;
use spacegate_core::form::{CreateSpaceError, SpaceCreator};
use spacegate_core::gateway::{DataEnvelope, ErrorBody, SpaceCreateArgs, SpaceWhereUnique};
use spacegate_core::types::UserId;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{status}: {}", .body.message)]
    Api { status: u16, body: ErrorBody },

    #[error("unexpected {status} response: {body}")]
    Unexpected { status: u16, body: String },

    #[error("not logged in; pass --token or set SPACEGATE_TOKEN")]
    NoToken,
}

impl From<ClientError> for CreateSpaceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { body, .. } => CreateSpaceError::from_error_body(&body),
            ClientError::Unexpected { status, body } => {
                CreateSpaceError::from_response(status, &body)
            }
            other => CreateSpaceError::Unknown(json!({ "message": other.to_string() }).to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
}

/// A signed-in session as returned by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub token: String,
    pub user: SessionUser,
    pub expires_in: u64,
}

impl SessionInfo {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.user.id.clone())
    }
}

/// Client for `/api/auth/*` and `/api/model/*`
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("spacegate-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::NoToken)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), "response received");

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|_| ClientError::Unexpected {
                status: status.as_u16(),
                body: text,
            });
        }

        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Err(ClientError::Api {
                status: status.as_u16(),
                body,
            }),
            Err(_) => Err(ClientError::Unexpected {
                status: status.as_u16(),
                body: text,
            }),
        }
    }

    pub async fn signup(&self, username: &str, password: &str) -> Result<SessionInfo, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/signup"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// The session behind the current token
    pub async fn session(&self) -> Result<SessionInfo, ClientError> {
        let response = self
            .http
            .get(self.url("/api/auth/session"))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// GET `/api/model/{model}/{operation}?q=<payload>`
    pub async fn read<T: DeserializeOwned>(
        &self,
        model: &str,
        operation: &str,
        payload: &Value,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/model/{model}/{operation}")))
            .bearer_auth(self.token()?)
            .query(&[("q", payload.to_string())])
            .send()
            .await?;
        let envelope: DataEnvelope<T> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    /// POST `/api/model/{model}/{operation}` with `payload` as the body
    pub async fn mutate<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        model: &str,
        operation: &str,
        payload: &P,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/api/model/{model}/{operation}")))
            .bearer_auth(self.token()?)
            .json(payload)
            .send()
            .await?;
        let envelope: DataEnvelope<T> = Self::decode(response).await?;
        Ok(envelope.data)
    }

    pub async fn find_space_by_slug(&self, slug: &str) -> Result<Space, ClientError> {
        let payload = json!({ "where": SpaceWhereUnique::slug(slug) });
        self.read("space", "findUnique", &payload).await
    }

    /// Whether the server rejected the token
    pub fn is_unauthorized(err: &ClientError) -> bool {
        matches!(err, ClientError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED.as_u16())
    }
}

#[async_trait]
impl SpaceCreator for GatewayClient {
    async fn create_space(&self, args: SpaceCreateArgs) -> Result<Space, CreateSpaceError> {
        self.mutate("space", "create", &args)
            .await
            .map_err(CreateSpaceError::from)
    }
}
