//! Cross-manager flows through the app shell, wired with the in-memory
//! collaborators.

use chrono::{Duration, Utc};
use std::sync::Arc;

use ember_core::ideas::{DecodedImage, ImageDecodeError, ImageDecoder};
use ember_core::models::{EventDraft, EventKind, SparkCategory};
use ember_core::services::docstore::collections;
use ember_core::services::memory::{MemoryIdentity, MemoryStore, StaticCommerce};
use ember_core::services::notify::LocalNotificationCenter;
use ember_core::services::settings::LocalSettings;
use ember_core::services::{CommerceGateway, DocumentStore, IdentityService, NotificationScheduler};
use ember_core::shell::{AppPhase, AppShell, Collaborators};
use ember_core::signal::UiSignal;

struct StubDecoder;

impl ImageDecoder for StubDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, ImageDecodeError> {
        Ok(DecodedImage {
            width: 1,
            height: 1,
            pixels: bytes.to_vec(),
        })
    }
}

struct Fixture {
    shell: AppShell,
    store: Arc<MemoryStore>,
    center: Arc<LocalNotificationCenter>,
    commerce: Arc<StaticCommerce>,
    identity: Arc<MemoryIdentity>,
}

fn fixture(dir: &std::path::Path) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let center = Arc::new(LocalNotificationCenter::new());
    let commerce = Arc::new(StaticCommerce::new());
    let identity = Arc::new(MemoryIdentity::new());

    let shell = AppShell::new(Collaborators {
        identity: Arc::clone(&identity) as Arc<dyn IdentityService>,
        store: Arc::clone(&store) as Arc<dyn DocumentStore>,
        scheduler: Arc::clone(&center) as Arc<dyn NotificationScheduler>,
        commerce: Arc::clone(&commerce) as Arc<dyn CommerceGateway>,
        decoder: Arc::new(StubDecoder),
        settings: LocalSettings::open(dir.join("settings.json")).unwrap(),
    });

    Fixture {
        shell,
        store,
        center,
        commerce,
        identity,
    }
}

fn anniversary_draft(reminder_on: bool) -> EventDraft {
    EventDraft {
        person: "Anniversary".to_string(),
        starts_at: Utc::now() + Duration::days(30),
        kind: EventKind::Anniversary,
        reminder_on,
        notes: None,
    }
}

#[tokio::test]
async fn the_first_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let Fixture {
        mut shell,
        store,
        center,
        ..
    } = fixture(dir.path());

    shell.bootstrap().await;
    shell.sign_up("a@b.c", "secret", "secret").await.unwrap();
    shell.complete_onboarding().await.unwrap();
    assert_eq!(shell.phase(), AppPhase::Main);

    // an empty name never reaches the store
    let rejected = shell
        .events
        .add(EventDraft {
            person: "".to_string(),
            ..anniversary_draft(true)
        })
        .await;
    assert!(rejected.is_err());
    assert!(shell.events.events().is_empty());
    assert!(shell.events.last_error().is_some());

    // a real event lands in memory, in the store, and in the scheduler
    let mut signals = shell.signals().subscribe();
    let id = shell.events.add(anniversary_draft(true)).await.unwrap();

    assert_eq!(shell.events.events().len(), 1);
    assert_eq!(store.len("user-1", collections::EVENTS), 1);
    assert_eq!(center.pending_ids().await, vec![id.to_string()]);
    assert_eq!(signals.recv().await.unwrap(), UiSignal::Celebrate);
}

#[tokio::test]
async fn a_second_launch_reuses_the_seeded_checklist() {
    let dir = tempfile::tempdir().unwrap();

    let first = fixture(dir.path());
    let mut shell = first.shell;
    shell.bootstrap().await;
    shell.sign_up("a@b.c", "secret", "secret").await.unwrap();
    assert_eq!(first.store.len("user-1", collections::SPARK_ITEMS), 50);

    // tick one free prompt, let the background persist land
    let free = shell
        .spark
        .chapter(SparkCategory::FirstSteps)
        .first()
        .map(|i| i.id)
        .unwrap();
    shell.spark.toggle(free).unwrap();
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    // a second shell over the same store and accounts: no reseed, state kept
    let mut second = AppShell::new(Collaborators {
        identity: Arc::clone(&first.identity) as Arc<dyn IdentityService>,
        store: Arc::clone(&first.store) as Arc<dyn DocumentStore>,
        scheduler: Arc::clone(&first.center) as Arc<dyn NotificationScheduler>,
        commerce: Arc::clone(&first.commerce) as Arc<dyn CommerceGateway>,
        decoder: Arc::new(StubDecoder),
        settings: LocalSettings::open(dir.path().join("settings.json")).unwrap(),
    });
    second.bootstrap().await;
    second.sign_in("a@b.c", "secret").await.unwrap();

    assert_eq!(first.store.len("user-1", collections::SPARK_ITEMS), 50);
    assert_eq!(second.spark.total_count(), 50);
    assert_eq!(second.spark.completed_count(), 1);
    assert_eq!(second.spark.completion_percent(), 2.0);
}

#[tokio::test]
async fn saving_from_the_feed_reaches_the_saved_list() {
    let dir = tempfile::tempdir().unwrap();
    let Fixture { mut shell, .. } = fixture(dir.path());

    shell.bootstrap().await;
    shell.sign_up("a@b.c", "secret", "secret").await.unwrap();

    let idea_id = shell.ideas.current().id.clone();
    shell.ideas.save_for("user-1");
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    shell.saved.load("user-1").await.unwrap();
    assert!(shell.saved.contains(&idea_id));
}

#[tokio::test]
async fn locked_toggle_paywall_purchase_unlock() {
    let dir = tempfile::tempdir().unwrap();
    let Fixture { mut shell, .. } = fixture(dir.path());

    shell.bootstrap().await;
    shell.sign_up("a@b.c", "secret", "secret").await.unwrap();

    let locked = shell
        .spark
        .chapter(SparkCategory::ThoughtfulGestures)
        .first()
        .map(|i| i.id)
        .unwrap();

    let mut signals = shell.signals().subscribe();
    assert!(shell.spark.toggle(locked).is_err());
    assert_eq!(signals.recv().await.unwrap(), UiSignal::PaywallPrompt);
    assert_eq!(shell.spark.completed_count(), 0);

    shell.purchase("ember.plus.yearly").await.unwrap();
    assert!(shell.spark.toggle(locked).unwrap());
    assert_eq!(shell.spark.completed_count(), 1);
}
