//! What the form shows and where it goes

use async_trait::async_trait;
use std::fmt;

/// Shown after a Space was created
pub const SPACE_CREATED_MESSAGE: &str = "Space created successfully! You'll be redirected.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Navigation targets reachable from the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Space(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Space(slug) => format!("/space/{}", slug),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Displays notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Performs navigation
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, route: Route);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Space("acme1".to_string()).path(), "/space/acme1");
        assert_eq!(Route::Space("acme1".to_string()).to_string(), "/space/acme1");
    }

    #[test]
    fn test_notification_levels() {
        assert_eq!(
            Notification::success(SPACE_CREATED_MESSAGE).level,
            NotificationLevel::Success
        );
        assert_eq!(Notification::error("x").level, NotificationLevel::Error);
    }
}
