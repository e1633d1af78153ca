//! Form UI rendered to the terminal

use std::sync::Mutex;

use async_trait::async_trait;
use spacegate_core::form::{Navigator, Notification, NotificationLevel, Notifier, Route};
use tracing::{debug, info};

/// Prints notifications: successes to stdout, errors to stderr
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => println!("{}", notification.message),
            NotificationLevel::Error => eprintln!("error: {}", notification.message),
        }
    }
}

/// Prints where the browser would go and remembers the last route
#[derive(Debug)]
pub struct TerminalNavigator {
    base_url: String,
    last: Mutex<Option<Route>>,
}

impl TerminalNavigator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            last: Mutex::new(None),
        }
    }

    pub fn last_route(&self) -> Option<Route> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

#[async_trait]
impl Navigator for TerminalNavigator {
    async fn navigate(&self, route: Route) {
        info!(route = %route, "navigating");
        println!("-> {}{}", self.base_url, route.path());

        match self.last.lock() {
            Ok(mut last) => *last = Some(route),
            Err(_) => debug!("navigator state poisoned; route not recorded"),
        }
    }
}
