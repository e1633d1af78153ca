//! Space creation form
//!
//! The form holds the entered name and slug, gates submission on the field
//! rules, and reports the outcome through a [`Notifier`] and a
//! [`Navigator`]. Rendering is up to the embedding client.

pub mod error;
pub mod flow;
pub mod state;
pub mod ui;

pub use error::{CreateSpaceError, FormError};
pub use flow::{CreateSpaceFlow, SpaceCreator, SubmitOutcome};
pub use state::{CreateSpaceForm, FormState};
pub use ui::{Navigator, Notification, NotificationLevel, Notifier, Route, SPACE_CREATED_MESSAGE};
