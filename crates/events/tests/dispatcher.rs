//! Integration tests for [`NotificationDispatcher`]: event in, notifier call out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use barter_core::proposal::{EVENT_PROPOSAL_ACCEPTED, EVENT_PROPOSAL_CREATED};
use barter_db::models::item::CreateItem;
use barter_db::models::proposal::Proposal;
use barter_db::models::user::CreateUser;
use barter_db::repositories::{ItemRepo, ProposalRepo, UserRepo};
use barter_events::delivery::email::EmailError;
use barter_events::{
    EventBus, NotificationDispatcher, NotificationKind, Notifier, NotifyError, PlatformEvent,
};
use serde_json::{json, Value};
use sqlx::PgPool;

const ALICE: &str = "52998224725";
const BOB: &str = "11144477735";

/// Records every call instead of sending anything.
#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<(String, NotificationKind, Value)>>,
}

impl RecordingNotifier {
    fn calls(&self) -> Vec<(String, NotificationKind, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        recipient_email: &str,
        kind: NotificationKind,
        payload: &Value,
    ) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .unwrap()
            .push((recipient_email.to_string(), kind, payload.clone()));
        Ok(())
    }
}

/// Fails every delivery, counting attempts.
#[derive(Default)]
struct FailingNotifier {
    attempts: AtomicUsize,
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(
        &self,
        _recipient_email: &str,
        _kind: NotificationKind,
        _payload: &Value,
    ) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(EmailError::Build("smtp unavailable".into()).into())
    }
}

/// Alice offers her lamp for Bob's chair.
async fn seed_proposal(pool: &PgPool) -> Proposal {
    for (id, name) in [(ALICE, "Alice"), (BOB, "Bob")] {
        UserRepo::create(
            pool,
            &CreateUser {
                national_id: id.to_string(),
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "x".to_string(),
                address: format!("{name} Street 1"),
            },
        )
        .await
        .unwrap();
    }
    let item = |name: &str| CreateItem {
        name: name.to_string(),
        description: format!("A fine {name}"),
        category: None,
        image_url: None,
    };
    let lamp = ItemRepo::create(pool, ALICE, &item("lamp")).await.unwrap();
    let chair = ItemRepo::create(pool, BOB, &item("chair")).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    ProposalRepo::create_pending(&mut conn, lamp.id, chair.id, ALICE, BOB)
        .await
        .unwrap()
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn created_event_notifies_the_item_owner(pool: PgPool) {
    let proposal = seed_proposal(&pool).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = NotificationDispatcher::new(pool, notifier.clone());

    let event = PlatformEvent::new(EVENT_PROPOSAL_CREATED)
        .with_source("proposal", proposal.id)
        .with_actor(ALICE)
        .with_recipient(BOB)
        .with_payload(json!({ "status": "pending" }));
    dispatcher.dispatch(&event).await.unwrap();

    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    let (email, kind, payload) = &calls[0];
    assert_eq!(email, "bob@example.com");
    assert_eq!(*kind, NotificationKind::NewProposal);
    assert_eq!(payload["offered_item_name"], "lamp");
    assert_eq!(payload["wanted_item_name"], "chair");
    assert_eq!(payload["counterpart_name"], "Alice");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unrelated_events_are_ignored(pool: PgPool) {
    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = NotificationDispatcher::new(pool, notifier.clone());

    dispatcher
        .dispatch(&PlatformEvent::new("item.created").with_recipient(BOB))
        .await
        .unwrap();

    assert!(notifier.calls().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_proposal_is_skipped(pool: PgPool) {
    let proposal = seed_proposal(&pool).await;
    ProposalRepo::delete_pending(&pool, proposal.id, ALICE)
        .await
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = NotificationDispatcher::new(pool, notifier.clone());
    let event = PlatformEvent::new(EVENT_PROPOSAL_CREATED)
        .with_source("proposal", proposal.id)
        .with_recipient(BOB);
    dispatcher.dispatch(&event).await.unwrap();

    assert!(notifier.calls().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn run_loop_delivers_until_bus_is_dropped(pool: PgPool) {
    let proposal = seed_proposal(&pool).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = NotificationDispatcher::new(pool, notifier.clone());

    let bus = EventBus::default();
    let handle = tokio::spawn(dispatcher.run(bus.subscribe()));

    bus.publish(
        PlatformEvent::new(EVENT_PROPOSAL_ACCEPTED)
            .with_source("proposal", proposal.id)
            .with_actor(BOB)
            .with_recipient(ALICE)
            .with_payload(json!({ "status": "accepted" })),
    );
    drop(bus);
    handle.await.unwrap();

    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "alice@example.com");
    assert_eq!(calls[0].1, NotificationKind::StatusChanged);
    assert_eq!(calls[0].2["status"], "accepted");
    assert_eq!(calls[0].2["counterpart_name"], "Bob");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn run_loop_survives_delivery_failures(pool: PgPool) {
    let proposal = seed_proposal(&pool).await;
    let notifier = Arc::new(FailingNotifier::default());
    let dispatcher = NotificationDispatcher::new(pool, notifier.clone());

    let bus = EventBus::default();
    let handle = tokio::spawn(dispatcher.run(bus.subscribe()));

    for _ in 0..2 {
        bus.publish(
            PlatformEvent::new(EVENT_PROPOSAL_CREATED)
                .with_source("proposal", proposal.id)
                .with_actor(ALICE)
                .with_recipient(BOB)
                .with_payload(json!({ "status": "pending" })),
        );
    }
    drop(bus);
    handle.await.unwrap();

    assert_eq!(notifier.attempts.load(Ordering::SeqCst), 2);
}
