//! Create-space scenarios run through the form, the gateway and a real store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use spacegate_core::core_space::{Space, SpaceKey, SpaceRole};
use spacegate_core::form::{
    CreateSpaceError, CreateSpaceFlow, CreateSpaceForm, FormError, FormState, NotificationLevel,
    Route, SpaceCreator, SubmitOutcome, SPACE_CREATED_MESSAGE,
};
use spacegate_core::gateway::{Gateway, GatewayError, GatewayRequest, SpaceCreateArgs};
use spacegate_core::test_utils::{test_gateway, RecordingNavigator, RecordingNotifier};
use spacegate_core::UserId;

/// Sends creates through `Gateway::dispatch` the way the HTTP layer does
struct DispatchingCreator {
    gateway: Gateway,
    identity: UserId,
    sent: std::sync::Mutex<usize>,
}

impl DispatchingCreator {
    fn new(gateway: Gateway, identity: &str) -> Self {
        Self {
            gateway,
            identity: UserId::new(identity),
            sent: std::sync::Mutex::new(0),
        }
    }

    fn sent(&self) -> usize {
        *self.sent.lock().unwrap()
    }
}

#[async_trait]
impl SpaceCreator for DispatchingCreator {
    async fn create_space(&self, args: SpaceCreateArgs) -> Result<Space, CreateSpaceError> {
        *self.sent.lock().unwrap() += 1;
        let payload = serde_json::to_value(&args).unwrap();
        let response = self
            .gateway
            .dispatch(
                Some(&self.identity),
                GatewayRequest::mutation("space", "create", payload),
            )
            .await
            .map_err(CreateSpaceError::from)?;
        assert_eq!(response.status, 201);
        Ok(serde_json::from_value(response.data).unwrap())
    }
}

struct Scenario {
    gateway: Gateway,
    creator: Arc<DispatchingCreator>,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
    flow: CreateSpaceFlow,
}

fn scenario(gateway: Gateway, user: &str) -> Scenario {
    let creator = Arc::new(DispatchingCreator::new(gateway.clone(), user));
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let flow = CreateSpaceFlow::new(creator.clone(), notifier.clone(), navigator.clone())
        .with_redirect_delay(Duration::from_secs(2));
    Scenario {
        gateway,
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
async fn test_acme_space_is_created_with_admin_membership() {
    let s = scenario(test_gateway(), "alice");
    let alice = UserId::new("alice");
    let started = tokio::time::Instant::now();

    let mut form = form("Acme Corp", "acme1");
    let outcome = s.flow.submit(&mut form, &alice).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(matches!(outcome, SubmitOutcome::Created(_)));
    assert_eq!(form.state(), FormState::Succeeded);
    assert_eq!(s.navigator.routes(), vec![Route::Space("acme1".to_string())]);

    let shown = s.notifier.notifications();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].level, NotificationLevel::Success);
    assert_eq!(shown[0].message, SPACE_CREATED_MESSAGE);

    let stored = s
        .gateway
        .store()
        .find_space(&SpaceKey::Slug("acme1".to_string()))
        .unwrap()
        .expect("space stored");
    assert_eq!(stored.name, "Acme Corp");
    assert_eq!(stored.members.len(), 1);
    assert_eq!(stored.role_of(&alice), Some(SpaceRole::Admin));
}

#[tokio::test(start_paused = true)]
async fn test_taken_slug_keeps_first_space_and_form_editable() {
    let gateway = test_gateway();
    let first = scenario(gateway.clone(), "alice");
    let second = scenario(gateway.clone(), "bob");

    let mut alice_form = form("Acme Corp", "acme1");
    first
        .flow
        .submit(&mut alice_form, &UserId::new("alice"))
        .await
        .unwrap();

    let mut bob_form = form("Acme Rival", "acme1");
    let outcome = second
        .flow
        .submit(&mut bob_form, &UserId::new("bob"))
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Failed(CreateSpaceError::Uniqueness));
    assert_eq!(bob_form.state(), FormState::Editing);
    assert_eq!(bob_form.name(), "Acme Rival");
    assert_eq!(bob_form.slug(), "acme1");
    assert!(second.navigator.routes().is_empty());
    assert_eq!(
        second.notifier.notifications()[0].message,
        "Space slug already in use"
    );

    // Bob can fix the slug and resubmit from the same form
    bob_form.set_slug("rival1").unwrap();
    let retry = second
        .flow
        .submit(&mut bob_form, &UserId::new("bob"))
        .await
        .unwrap();
    assert!(matches!(retry, SubmitOutcome::Created(_)));

    let store = gateway.store();
    let original = store
        .find_space(&SpaceKey::Slug("acme1".to_string()))
        .unwrap()
        .unwrap();
    assert_eq!(original.name, "Acme Corp");
    assert!(original.is_admin(&UserId::new("alice")));
    assert!(!original.is_member(&UserId::new("bob")));
}

#[tokio::test]
async fn test_cancel_sends_nothing() {
    let s = scenario(test_gateway(), "alice");

    let mut form = form("Acme Corp", "acme1");
    s.flow.cancel(&mut form).await.unwrap();

    assert_eq!(s.creator.sent(), 0);
    assert_eq!(s.navigator.routes(), vec![Route::Home]);
    assert!(s.notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_invalid_input_sends_nothing() {
    let s = scenario(test_gateway(), "alice");
    let alice = UserId::new("alice");

    for (name, slug) in [("abc", "acme1"), ("Acme Corp", "ac"), ("Acme Corp", "acme-1")] {
        let mut form = form(name, slug);
        assert!(!form.can_submit());
        let err = s.flow.submit(&mut form, &alice).await.unwrap_err();
        assert!(matches!(err, FormError::Invalid(_)), "{name}/{slug}: {err:?}");
        assert_eq!(form.state(), FormState::Editing);
    }

    assert_eq!(s.creator.sent(), 0);
    assert!(s.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_gateway_rejects_what_the_form_would_block() {
    let gateway = test_gateway();
    let alice = UserId::new("alice");

    let err = gateway
        .dispatch(
            Some(&alice),
            GatewayRequest::mutation(
                "space",
                "create",
                json!({ "data": {
                    "name": "Acme Corp",
                    "slug": "acme-1",
                    "members": { "create": { "userId": "alice", "role": "ADMIN" } }
                }}),
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(CreateSpaceError::from(err), CreateSpaceError::Other {
        code: "P2007".to_string()
    });

    let err = gateway
        .dispatch(None, GatewayRequest::mutation("space", "create", Value::Null))
        .await
        .unwrap_err();
    assert_eq!(err, GatewayError::Unauthenticated);
    assert_eq!(gateway.store().count_spaces(&Default::default()).unwrap(), 0);
}
