//! Server state shared across requests

use spacegate_core::config::Config;
use spacegate_core::core_space::SpaceSqlStore;
use spacegate_core::gateway::Gateway;
use spacegate_core::health::HealthChecker;
use std::sync::Arc;

use crate::auth::UserStore;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Gateway,
    pub users: UserStore,
    pub sessions: SessionManager,
    pub health: HealthChecker,
}

impl AppState {
    /// Wire everything to one store
    pub fn new(config: Config, store: SpaceSqlStore) -> Self {
        let users = UserStore::new(store.pool().clone());
        let sessions = SessionManager::new(config.session.ttl);
        Self {
            config: Arc::new(config),
            gateway: Gateway::new(store),
            users,
            sessions,
            health: HealthChecker::new(env!("CARGO_PKG_VERSION")),
        }
    }

    /// Open the configured store and build state around it
    pub fn open(config: Config) -> anyhow::Result<Self> {
        let store = SpaceSqlStore::open(&config.store)?;
        Ok(Self::new(config, store))
    }
}
