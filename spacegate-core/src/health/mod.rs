//! Health reporting for the server's `/health` endpoint

use crate::core_space::SpaceSqlStore;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> u16 {
        match self {
            HealthStatus::Healthy => 200,
            HealthStatus::Degraded => 200,
            HealthStatus::Unhealthy => 503,
        }
    }
}

/// Health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub timestamp: Timestamp,
    pub components: Vec<ComponentHealth>,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Component health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check: Timestamp,
}

impl ComponentHealth {
    /// Create a healthy component
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Healthy,
            message: None,
            last_check: Timestamp::now(),
        }
    }

    /// Create an unhealthy component
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            last_check: Timestamp::now(),
        }
    }
}

/// Health checker service
#[derive(Clone)]
pub struct HealthChecker {
    started: Instant,
    version: String,
    components: Arc<RwLock<Vec<ComponentHealth>>>,
}

impl HealthChecker {
    /// Create a new health checker
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            started: Instant::now(),
            version: version.into(),
            components: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Record the latest result for a component, replacing any earlier one
    pub async fn report(&self, health: ComponentHealth) {
        let mut components = self.components.write().await;
        match components.iter_mut().find(|c| c.name == health.name) {
            Some(existing) => *existing = health,
            None => components.push(health),
        }
    }

    /// Get current health status
    pub async fn check_health(&self) -> HealthCheck {
        let components = self.components.read().await.clone();

        let status = if components.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if components.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthCheck {
            status,
            timestamp: Timestamp::now(),
            components,
            version: self.version.clone(),
            uptime_seconds: self.started.elapsed().as_secs(),
        }
    }
}

/// Built-in health checks
pub mod checks {
    use super::*;

    /// Run a trivial query against the database
    pub async fn check_database(store: &SpaceSqlStore) -> ComponentHealth {
        let store = store.clone();
        match tokio::task::spawn_blocking(move || store.ping()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(e)) => ComponentHealth::unhealthy("database", e.to_string()),
            Err(e) => ComponentHealth::unhealthy("database", format!("database check task failed: {}", e)),
        }
    }
}
