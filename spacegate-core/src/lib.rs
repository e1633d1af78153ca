//! SpaceGate core library
//!
//! Domain model, storage and the two request-facing components of SpaceGate:
//! the Model Gateway (identity-scoped data access) and the Space creation
//! flow that drives it from a client.

pub mod config;
pub mod core_space;
pub mod form;
pub mod gateway;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod shutdown;
pub mod test_utils;
pub mod types;

pub use core_space::{
    DataError, DataErrorKind, Space, SpaceId, SpaceMember, SpaceRole, SpaceSqlStore,
};
pub use gateway::{Gateway, GatewayError, ScopedClient};
pub use logging::{init_logging, LogLevel};
pub use types::{Timestamp, UserId};
