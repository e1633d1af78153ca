//! Test fixtures for creating common test objects

use crate::core_space::{NewSpace, Space, SpaceSqlStore};
use crate::gateway::{Gateway, ScopedClient};
use crate::types::UserId;

/// Fresh in-memory store with migrations applied
pub fn test_store() -> SpaceSqlStore {
    SpaceSqlStore::in_memory().expect("in-memory store")
}

/// Gateway over a fresh in-memory store
pub fn test_gateway() -> Gateway {
    Gateway::new(test_store())
}

/// Builder for seeding Spaces directly into a store
pub struct TestSpaceBuilder {
    name: String,
    slug: String,
    creator: UserId,
}

impl TestSpaceBuilder {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            name: "Test Space".to_string(),
            slug: slug.into(),
            creator: UserId::new("test-user"),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn created_by(mut self, creator: UserId) -> Self {
        self.creator = creator;
        self
    }

    pub fn insert(self, store: &SpaceSqlStore) -> Space {
        store
            .create_space(&NewSpace::with_creator(self.name, self.slug, self.creator))
            .expect("seed space")
    }
}

/// Scoped client for `user` over `store`
pub fn client_for(store: &SpaceSqlStore, user: &str) -> ScopedClient {
    ScopedClient::new(store.clone(), UserId::new(user))
}
