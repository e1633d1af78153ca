//! SpaceGate HTTP API
//!
//! Serves the Model Gateway under `/api/model/:model/:operation` and the
//! built-in identity provider under `/api/auth/*`.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod session;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use server::{build_router, ApiServer};
pub use state::AppState;
