//! Model Gateway
//!
//! Generic data access over `/{model}/{operation}`. Every request is
//! handled the same way:
//!
//! 1. the caller's identity is required
//! 2. a [`ScopedClient`] is built for that caller
//! 3. the target is checked against the allow-list
//! 4. the payload is decoded into typed arguments and the call delegated
//!
//! Payloads arrive undecoded so that nothing about them is reported to a
//! caller who fails steps 1 or 3.

pub mod args;
pub mod client;
pub mod error;
pub mod operation;
pub mod wire;

pub use args::{
    SpaceCountArgs, SpaceCreateArgs, SpaceFindManyArgs, SpaceFindUniqueArgs, SpaceUserCountArgs,
    SpaceUserFindManyArgs, SpaceUserWhere, SpaceWhere, SpaceWhereUnique,
};
pub use client::ScopedClient;
pub use error::GatewayError;
pub use operation::{ModelName, Operation, Target};
pub use wire::{DataEnvelope, ErrorBody, ErrorInfo};

use crate::core_space::SpaceSqlStore;
use crate::metrics::{self as gm, Timer};
use crate::types::UserId;
use metrics::counter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// How a request reached the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// GET with the payload in `?q=`
    Read,
    /// POST with a JSON body
    Mutation,
}

/// Payload of a gateway call, as it arrived
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Already-decoded JSON; `null` reads as `{}`
    Json(Value),
    /// Undecoded JSON text from `?q=` or a body; blank reads as `{}`
    Raw(Vec<u8>),
    /// The transport could not extract a payload at all
    Rejected(GatewayError),
}

impl Payload {
    fn decode(self) -> Result<Value, GatewayError> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Raw(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Value::Null),
            Payload::Raw(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Payload::Rejected(err) => Err(err),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// One gateway call: `/{model}/{operation}` plus its payload
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    pub kind: RequestKind,
    pub model: String,
    pub operation: String,
    pub payload: Payload,
}

impl GatewayRequest {
    pub fn read(
        model: impl Into<String>,
        operation: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Self {
        Self {
            kind: RequestKind::Read,
            model: model.into(),
            operation: operation.into(),
            payload: payload.into(),
        }
    }

    pub fn mutation(
        model: impl Into<String>,
        operation: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Self {
        Self {
            kind: RequestKind::Mutation,
            model: model.into(),
            operation: operation.into(),
            payload: payload.into(),
        }
    }
}

/// Successful dispatch result
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    /// 201 for creates, 200 otherwise
    pub status: u16,
    pub data: Value,
}

/// Entry point shared by all gateway requests
#[derive(Clone)]
pub struct Gateway {
    store: SpaceSqlStore,
}

impl Gateway {
    pub fn new(store: SpaceSqlStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SpaceSqlStore {
        &self.store
    }

    /// Data client bound to `user`
    pub fn client_for(&self, user: UserId) -> ScopedClient {
        ScopedClient::new(self.store.clone(), user)
    }

    /// Handle one request on behalf of `identity`
    pub async fn dispatch(
        &self,
        identity: Option<&UserId>,
        request: GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let model = request.model.clone();
        let operation = request.operation.clone();
        let result = self.dispatch_inner(identity, request).await;

        if let Err(err) = &result {
            match err {
                GatewayError::Data(data) => {
                    counter!(gm::GATEWAY_DATA_ERRORS, "code" => data.code()).increment(1);
                    debug!(%model, %operation, code = data.code(), "data error: {}", data);
                }
                other => {
                    gm::record_counter(gm::GATEWAY_REJECTED, 1);
                    warn!(%model, %operation, status = other.status_code(), "rejected: {}", other);
                }
            }
        }

        result
    }

    async fn dispatch_inner(
        &self,
        identity: Option<&UserId>,
        request: GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let user = identity.ok_or(GatewayError::Unauthenticated)?;
        let client = self.client_for(user.clone());
        let target = Target::resolve(&request.model, &request.operation)?;

        let operation = target.operation();
        let expected = if operation.is_mutation() {
            RequestKind::Mutation
        } else {
            RequestKind::Read
        };
        if request.kind != expected {
            return Err(GatewayError::WrongMethod {
                operation: operation.as_str(),
                expected: match expected {
                    RequestKind::Mutation => "POST",
                    RequestKind::Read => "GET",
                },
            });
        }

        counter!(
            gm::GATEWAY_REQUESTS,
            "model" => target.model().as_str(),
            "operation" => operation.as_str()
        )
        .increment(1);
        debug!(user_id = %user, %target, "dispatching");

        let _timer = Timer::new(gm::GATEWAY_DISPATCH_DURATION);
        let payload = request.payload.decode()?;
        let data = match target {
            Target::SpaceCreate => {
                let space = client.create_space(parse(payload)?).await?;
                gm::record_counter(gm::SPACES_CREATED, 1);
                to_value(&space)?
            }
            Target::SpaceFindUnique => {
                to_value(&client.find_unique_space(parse(payload)?).await?)?
            }
            Target::SpaceFindFirst => {
                to_value(&client.find_first_space(parse(payload)?).await?)?
            }
            Target::SpaceFindMany => {
                to_value(&client.find_spaces(parse(payload)?).await?)?
            }
            Target::SpaceCount => {
                to_value(&client.count_spaces(parse(payload)?).await?)?
            }
            Target::SpaceUserFindMany => {
                to_value(&client.find_members(parse(payload)?).await?)?
            }
            Target::SpaceUserCount => {
                to_value(&client.count_members(parse(payload)?).await?)?
            }
        };

        let status = if operation.is_mutation() { 201 } else { 200 };
        Ok(GatewayResponse { status, data })
    }
}

fn parse<T: DeserializeOwned>(payload: Value) -> Result<T, GatewayError> {
    let payload = match payload {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    Ok(serde_json::from_value(payload)?)
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Internal(e.to_string()))
}
