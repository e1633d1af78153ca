//! Drives a [`CreateSpaceForm`] through one submission

use super::error::{CreateSpaceError, FormError};
use super::state::CreateSpaceForm;
use super::ui::{Navigator, Notification, Notifier, SPACE_CREATED_MESSAGE};
use crate::config::FormConfig;
use crate::core_space::Space;
use crate::gateway::{ScopedClient, SpaceCreateArgs};
use crate::metrics::{record_counter, FORM_FAILURES, FORM_SUBMISSIONS};
use crate::types::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can carry out a create-Space request
#[async_trait]
pub trait SpaceCreator: Send + Sync {
    async fn create_space(&self, args: SpaceCreateArgs) -> Result<Space, CreateSpaceError>;
}

#[async_trait]
impl SpaceCreator for ScopedClient {
    async fn create_space(&self, args: SpaceCreateArgs) -> Result<Space, CreateSpaceError> {
        ScopedClient::create_space(self, args)
            .await
            .map_err(CreateSpaceError::from)
    }
}

/// Result of a submission that was actually sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Space),
    Failed(CreateSpaceError),
}

/// Submission and cancel handling around a form
pub struct CreateSpaceFlow {
    creator: Arc<dyn SpaceCreator>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
}

impl CreateSpaceFlow {
    pub fn new(
        creator: Arc<dyn SpaceCreator>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            creator,
            notifier,
            navigator,
            redirect_delay: FormConfig::default().redirect_delay,
        }
    }

    pub fn with_config(mut self, config: &FormConfig) -> Self {
        self.redirect_delay = config.redirect_delay;
        self
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Submit the form as `user`
    ///
    /// Returns `Err` only when nothing was sent (invalid fields or a
    /// submission already in flight). Request failures are reported to the
    /// notifier and come back as [`SubmitOutcome::Failed`] with the form
    /// editable again.
    pub async fn submit(
        &self,
        form: &mut CreateSpaceForm,
        user: &UserId,
    ) -> Result<SubmitOutcome, FormError> {
        let args = form.begin_submit(user)?;
        record_counter(FORM_SUBMISSIONS, 1);
        debug!(user_id = %user, slug = %args.data.slug, "submitting create-space form");

        match self.creator.create_space(args).await {
            Ok(space) => {
                let route = form.succeed(&space)?;
                info!(space_id = %space.id, slug = %space.slug, "space created");
                self.notifier.notify(Notification::success(SPACE_CREATED_MESSAGE));

                // Leave the success message on screen before moving on
                tokio::time::sleep(self.redirect_delay).await;
                self.navigator.navigate(route).await;

                Ok(SubmitOutcome::Created(space))
            }
            Err(err) => {
                record_counter(FORM_FAILURES, 1);
                warn!(user_id = %user, "space creation failed: {:?}", err);
                self.notifier.notify(Notification::error(err.user_message()));

                form.fail(err.clone())?;
                form.resume_editing();
                Ok(SubmitOutcome::Failed(err))
            }
        }
    }

    /// Leave the form; never sends a request
    pub async fn cancel(&self, form: &mut CreateSpaceForm) -> Result<(), FormError> {
        let route = form.cancel()?;
        self.navigator.navigate(route).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::state::FormState;
    use crate::form::ui::{NotificationLevel, Route};
    use crate::test_utils::{RecordingNavigator, RecordingNotifier, StubCreator};

    struct Harness {
        creator: Arc<StubCreator>,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<RecordingNavigator>,
        flow: CreateSpaceFlow,
    }

    fn harness(creator: StubCreator) -> Harness {
        let creator = Arc::new(creator);
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let flow = CreateSpaceFlow::new(creator.clone(), notifier.clone(), navigator.clone())
            .with_redirect_delay(Duration::from_secs(2));
        Harness {
            creator,
            notifier,
            navigator,
            flow,
        }
    }

    fn form(name: &str, slug: &str) -> CreateSpaceForm {
        let mut form = CreateSpaceForm::new();
        form.set_name(name).unwrap();
        form.set_slug(slug).unwrap();
        form
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_notifies_then_redirects_after_delay() {
        let h = harness(StubCreator::succeeding());
        let mut form = form("Acme Corp", "acme1");
        let user = UserId::new("alice");

        let started = tokio::time::Instant::now();
        let outcome = h.flow.submit(&mut form, &user).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Created(ref s) if s.slug == "acme1"));
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(form.state(), FormState::Succeeded);
        assert_eq!(
            h.notifier.notifications(),
            vec![Notification::success(SPACE_CREATED_MESSAGE)]
        );
        assert_eq!(h.navigator.routes(), vec![Route::Space("acme1".to_string())]);
        assert_eq!(h.creator.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_redirect_delay_taken_from_form_config() {
        let creator = Arc::new(StubCreator::succeeding());
        let navigator = Arc::new(RecordingNavigator::default());
        let config = FormConfig {
            redirect_delay: Duration::from_secs(5),
        };
        let flow = CreateSpaceFlow::new(
            creator,
            Arc::new(RecordingNotifier::default()),
            navigator.clone(),
        )
        .with_config(&config);

        let started = tokio::time::Instant::now();
        flow.submit(&mut form("Acme Corp", "acme1"), &UserId::new("alice"))
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(navigator.routes(), vec![Route::Space("acme1".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uniqueness_failure_returns_to_editing() {
        let h = harness(StubCreator::failing(CreateSpaceError::Uniqueness));
        let mut form = form("Acme Corp", "acme1");

        let outcome = h.flow.submit(&mut form, &UserId::new("alice")).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Failed(CreateSpaceError::Uniqueness));
        assert_eq!(form.state(), FormState::Editing);
        let notes = h.notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(notes[0].message, "Space slug already in use");
        assert!(h.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_other_code_message() {
        let h = harness(StubCreator::failing(CreateSpaceError::Other {
            code: "P2004".to_string(),
        }));
        let mut form = form("Acme Corp", "acme1");

        h.flow.submit(&mut form, &UserId::new("alice")).await.unwrap();
        assert_eq!(
            h.notifier.notifications()[0].message,
            "Unexpected data error: P2004"
        );
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let h = harness(StubCreator::succeeding());
        let mut form = form("abc", "acme1");

        let err = h.flow.submit(&mut form, &UserId::new("alice")).await.unwrap_err();
        assert!(matches!(err, FormError::Invalid(_)));
        assert!(h.creator.calls().is_empty());
        assert!(h.notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_navigates_home_without_request() {
        let h = harness(StubCreator::succeeding());
        let mut form = form("Acme Corp", "acme1");

        h.flow.cancel(&mut form).await.unwrap();

        assert_eq!(h.navigator.routes(), vec![Route::Home]);
        assert!(h.creator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_with_scoped_client() {
        let store = crate::core_space::SpaceSqlStore::in_memory().unwrap();
        let user = UserId::new("alice");
        let client = Arc::new(ScopedClient::new(store.clone(), user.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let flow = CreateSpaceFlow::new(client, notifier, navigator.clone());

        let mut form = form("Acme Corp", "acme1");
        flow.submit(&mut form, &user).await.unwrap();

        assert!(store.slug_exists("acme1").unwrap());
        assert_eq!(navigator.routes(), vec![Route::Space("acme1".to_string())]);
    }
}
