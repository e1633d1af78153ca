//! Recording doubles for the form's collaborators

use crate::core_space::{Space, SpaceId, SpaceMember};
use crate::form::{CreateSpaceError, Navigator, Notification, Notifier, Route, SpaceCreator};
use crate::gateway::SpaceCreateArgs;
use crate::types::Timestamp;
use async_trait::async_trait;
use std::sync::Mutex;

/// Notifier that keeps everything it was shown
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

/// Navigator that keeps every route it was sent to
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// Creator with a canned answer that records its requests
pub struct StubCreator {
    failure: Option<CreateSpaceError>,
    calls: Mutex<Vec<SpaceCreateArgs>>,
}

impl StubCreator {
    /// Echoes the request back as a created Space
    pub fn succeeding() -> Self {
        Self {
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: CreateSpaceError) -> Self {
        Self {
            failure: Some(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<SpaceCreateArgs> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpaceCreator for StubCreator {
    async fn create_space(&self, args: SpaceCreateArgs) -> Result<Space, CreateSpaceError> {
        self.calls.lock().unwrap().push(args.clone());
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let id = SpaceId::generate();
        let now = Timestamp::now();
        let new = args.into_new_space();
        Ok(Space {
            id,
            name: new.name,
            slug: new.slug,
            created_at: now,
            updated_at: now,
            members: new
                .members
                .into_iter()
                .map(|m| SpaceMember {
                    space_id: id,
                    user_id: m.user_id,
                    role: m.role,
                    joined_at: now,
                })
                .collect(),
        })
    }
}
