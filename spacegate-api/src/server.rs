//! Router and HTTP server

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use spacegate_core::shutdown::ShutdownCoordinator;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers;
use crate::middleware::auth::{require_session, resolve_session};
use crate::state::AppState;

/// Build the API router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    let public_auth = Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login));

    let session_auth = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/session", get(handlers::auth::current_session))
        .route_layer(middleware::from_fn(require_session));

    // Anonymous callers reach the gateway, which answers 401 itself
    let model = Router::new().route(
        "/api/model/:model/:operation",
        get(handlers::model::read).post(handlers::model::mutate),
    );

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(public_auth)
        .merge(session_auth)
        .merge(model)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server for the gateway and auth endpoints
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl ApiServer {
    pub fn new(state: AppState, shutdown: Arc<ShutdownCoordinator>) -> Self {
        Self {
            state: Arc::new(state),
            shutdown,
        }
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.server.bind_address;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!("SpaceGate API listening on {}", listener.local_addr()?);

        let sessions = self.state.sessions.clone();
        let ttl = self.state.config.session.ttl;
        let sweeper = tokio::spawn(async move {
            let mut interval = tokio::time::interval(ttl.max(std::time::Duration::from_secs(60)));
            loop {
                interval.tick().await;
                let purged = sessions.purge_expired().await;
                if purged > 0 {
                    info!(purged, "expired sessions removed");
                }
            }
        });

        let router = build_router(self.state);
        let shutdown = self.shutdown.clone();
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.wait_for_shutdown().await })
            .into_future();

        let drain = self.shutdown.drain_timeout();
        let shutdown = self.shutdown.clone();
        tokio::select! {
            result = server => result?,
            _ = async {
                shutdown.wait_for_shutdown().await;
                tokio::time::sleep(drain).await;
            } => {
                warn!("In-flight requests did not finish within {:?}", drain);
            }
        }

        sweeper.abort();
        self.shutdown.complete().await;
        Ok(())
    }
}
