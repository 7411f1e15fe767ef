use std::{sync::Arc, time::Duration};

use chewzy_be::{
    db::{MemoryStore, RecordStore},
    errors::AppError,
    identity::ClientIdentity,
    likes::{LikeCoordinator, LikePhase, LikeSnapshot},
    models::{ChangeEvent, LikeServerMessage, ReviewLike},
};
use chrono::Utc;
use tokio::time::{sleep, timeout};
use uuid::Uuid;

const WAIT: Duration = Duration::from_secs(2);

fn identity(raw: &str) -> ClientIdentity {
    ClientIdentity::parse(raw).unwrap()
}

fn like_from(review_id: Uuid, name: &str, identity: &ClientIdentity) -> ReviewLike {
    ReviewLike {
        id: Uuid::new_v4(),
        review_id,
        user_name: name.to_string(),
        user_identity: identity.as_str().to_string(),
        created_at: Some(Utc::now()),
    }
}

async fn setup(raw_identity: &str) -> (Arc<MemoryStore>, Arc<LikeCoordinator>, Uuid) {
    let store = Arc::new(MemoryStore::new());
    let review_id = Uuid::new_v4();
    let coordinator = LikeCoordinator::load(store.clone(), identity(raw_identity), review_id)
        .await
        .unwrap();

    (store, Arc::new(coordinator), review_id)
}

#[tokio::test]
async fn starts_unliked_with_no_endorsers() {
    let (_, coordinator, review_id) = setup("user-i1").await;

    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.review_id, review_id);
    assert_eq!(snapshot.phase, LikePhase::Unliked);
    assert_eq!(snapshot.count, 0);
    assert!(!snapshot.has_liked);
}

#[tokio::test]
async fn loads_as_liked_when_identity_already_endorsed() {
    let store = Arc::new(MemoryStore::new());
    let review_id = Uuid::new_v4();
    let me = identity("user-i1");
    store.add_like(like_from(review_id, "Asha", &me)).await;

    let coordinator = LikeCoordinator::load(store.clone(), me, review_id)
        .await
        .unwrap();

    assert_eq!(coordinator.phase().await, LikePhase::Liked);
    assert_eq!(coordinator.snapshot().await.count, 1);
}

#[tokio::test]
async fn endorse_records_a_named_like() {
    let (store, coordinator, review_id) = setup("user-i1").await;
    store
        .add_like(like_from(review_id, "Ravi", &identity("user-other")))
        .await;
    coordinator.refresh().await.unwrap();

    let snapshot = coordinator.endorse("  Asha ").await.unwrap();

    assert_eq!(snapshot.phase, LikePhase::Liked);
    assert!(snapshot.has_liked);
    assert_eq!(snapshot.count, 2);
    assert_eq!(snapshot.endorsers[0].user_name, "Asha");
    assert_eq!(snapshot.draft_name, None);
    assert_eq!(store.like_insert_count(), 1);

    let stored = store.list_likes(review_id).await.unwrap();
    assert!(stored.iter().any(|l| l.user_identity == "user-i1"));
}

#[tokio::test]
async fn second_endorse_is_refused_without_touching_the_store() {
    let (store, coordinator, _) = setup("user-i1").await;
    coordinator.endorse("Asha").await.unwrap();

    let inserts = store.like_insert_count();
    let fetches = store.like_fetch_count();

    let result = coordinator.endorse("Asha").await;

    assert!(matches!(result, Err(AppError::AlreadyLiked)));
    assert_eq!(store.like_insert_count(), inserts);
    assert_eq!(store.like_fetch_count(), fetches);
    assert_eq!(coordinator.phase().await, LikePhase::Liked);
}

#[tokio::test]
async fn blank_name_is_a_field_error() {
    let (store, coordinator, _) = setup("user-i1").await;

    let result = coordinator.endorse("   ").await;

    match result {
        Err(AppError::Validation(fields)) => {
            assert_eq!(
                fields.get("userName").map(String::as_str),
                Some("Please enter your name")
            );
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert_eq!(store.like_insert_count(), 0);
    assert_eq!(coordinator.phase().await, LikePhase::Unliked);
}

#[tokio::test]
async fn failed_write_rolls_back_and_keeps_the_name() {
    let (store, coordinator, _) = setup("user-i1").await;
    store.set_fail_writes(true);

    let result = coordinator.endorse("Asha").await;
    assert!(matches!(result, Err(AppError::NetworkFailure(_))));

    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.phase, LikePhase::Unliked);
    assert_eq!(snapshot.count, 0);
    assert_eq!(snapshot.draft_name.as_deref(), Some("Asha"));

    store.set_fail_writes(false);
    let snapshot = coordinator.endorse("Asha").await.unwrap();
    assert_eq!(snapshot.phase, LikePhase::Liked);
    assert_eq!(snapshot.draft_name, None);
    assert_eq!(store.like_insert_count(), 2);
}

#[tokio::test]
async fn store_duplicate_settles_as_liked() {
    let (store, coordinator, review_id) = setup("user-i1").await;
    // Same profile liked from another tab after this coordinator loaded.
    store
        .add_like(like_from(review_id, "Asha", &identity("user-i1")))
        .await;

    let result = coordinator.endorse("Asha").await;

    assert!(matches!(result, Err(AppError::AlreadyLiked)));
    assert_eq!(coordinator.phase().await, LikePhase::Liked);
}

#[tokio::test]
async fn concurrent_endorsements_insert_once() {
    let (store, coordinator, _) = setup("user-i1").await;

    let first = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.endorse("Asha").await }
    });
    let second = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.endorse("Asha").await }
    });

    let results = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(AppError::AlreadyLiked) | Err(AppError::LikeInFlight)
    )));
    assert_eq!(store.like_insert_count(), 1);
}

#[tokio::test]
async fn events_for_other_reviews_do_not_refetch() {
    let (store, coordinator, _) = setup("user-i1").await;
    let fetches = store.like_fetch_count();

    let event = ChangeEvent::inserted(Uuid::new_v4(), Uuid::new_v4());
    let outcome = coordinator.reconcile(&event).await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(store.like_fetch_count(), fetches);
}

#[tokio::test]
async fn reconcile_picks_up_other_viewers() {
    let (store, coordinator, review_id) = setup("user-i1").await;
    store
        .add_like(like_from(review_id, "Ravi", &identity("user-other")))
        .await;

    let event = ChangeEvent::inserted(review_id, Uuid::new_v4());
    let snapshot = coordinator.reconcile(&event).await.unwrap().unwrap();

    assert_eq!(snapshot.count, 1);
    assert!(!snapshot.has_liked);
    assert_eq!(snapshot.phase, LikePhase::Unliked);
}

#[tokio::test]
async fn liked_survives_a_refetch_without_the_like() {
    let (store, coordinator, review_id) = setup("user-i1").await;
    coordinator.endorse("Asha").await.unwrap();

    let mine = store.list_likes(review_id).await.unwrap()[0].id;
    store.remove_like(mine).await;

    let snapshot = coordinator.refresh().await.unwrap();
    assert_eq!(snapshot.phase, LikePhase::Liked);
    assert!(snapshot.has_liked);
    assert_eq!(snapshot.count, 0);
}

#[tokio::test]
async fn watch_delivers_refreshed_snapshots() {
    let (store, coordinator, review_id) = setup("user-i1").await;
    let mut watch = coordinator.watch().await.unwrap();

    // Noise on another review is filtered out before it reaches the watch.
    store
        .add_like(like_from(Uuid::new_v4(), "Elsewhere", &identity("user-x")))
        .await;
    store
        .add_like(like_from(review_id, "Ravi", &identity("user-other")))
        .await;

    let snapshot = timeout(WAIT, watch.next())
        .await
        .expect("no snapshot in time")
        .expect("watch closed")
        .unwrap();

    assert_eq!(snapshot.count, 1);
    assert_eq!(snapshot.endorsers[0].user_name, "Ravi");
    watch.close();
}

#[tokio::test]
async fn closing_the_watch_releases_the_subscription() {
    let (store, coordinator, _) = setup("user-i1").await;
    assert_eq!(store.subscriber_count(), 0);

    let watch = coordinator.watch().await.unwrap();
    assert!(watch.is_open());
    assert_eq!(store.subscriber_count(), 1);

    watch.close();
    assert_eq!(store.subscriber_count(), 0);

    let dropped = coordinator.watch().await.unwrap();
    assert_eq!(store.subscriber_count(), 1);
    drop(dropped);
    assert_eq!(store.subscriber_count(), 0);
}

#[tokio::test]
async fn failed_write_does_not_undo_a_like_seen_meanwhile() {
    let (store, coordinator, review_id) = setup("user-i1").await;
    store.set_write_delay(Duration::from_millis(200));
    store.set_fail_writes(true);

    let pending = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.endorse("Asha").await }
    });

    sleep(Duration::from_millis(50)).await;
    assert_eq!(coordinator.phase().await, LikePhase::Liking);

    // Another tab of the same profile lands its like while ours is in flight.
    store
        .add_like(like_from(review_id, "Asha", &identity("user-i1")))
        .await;
    let refreshed = coordinator.refresh().await.unwrap();
    assert_eq!(refreshed.phase, LikePhase::Liked);

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(AppError::NetworkFailure(_))));

    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.phase, LikePhase::Liked);
    assert!(snapshot.has_liked);
    assert_eq!(snapshot.count, 1);
}

#[tokio::test]
async fn interrupted_watch_still_delivers_the_event() {
    let (store, coordinator, review_id) = setup("user-i1").await;
    let mut watch = coordinator.watch().await.unwrap();
    store.set_fetch_delay(Duration::from_millis(200));

    store
        .add_like(like_from(review_id, "Ravi", &identity("user-other")))
        .await;

    // The event is taken off the feed, then the refresh is abandoned midway.
    tokio::select! {
        _ = watch.next() => panic!("refresh finished before the delay"),
        _ = sleep(Duration::from_millis(20)) => {}
    }

    let snapshot = timeout(Duration::from_millis(800), watch.next())
        .await
        .expect("pending event was lost")
        .expect("watch closed")
        .unwrap();

    assert_eq!(snapshot.count, 1);
    assert_eq!(snapshot.endorsers[0].user_name, "Ravi");
}

#[tokio::test]
async fn watch_resubscribes_once_when_the_feed_ends() {
    let (store, coordinator, review_id) = setup("user-i1").await;
    let mut watch = coordinator.watch().await.unwrap();

    store.end_subscriptions();
    // Nothing to report yet; the watch reopens its feed and keeps waiting.
    assert!(timeout(Duration::from_millis(50), watch.next()).await.is_err());
    assert!(watch.is_open());
    assert_eq!(store.subscriber_count(), 1);

    store
        .add_like(like_from(review_id, "Ravi", &identity("user-other")))
        .await;
    let snapshot = timeout(WAIT, watch.next())
        .await
        .expect("no snapshot after resubscribe")
        .expect("watch closed")
        .unwrap();
    assert_eq!(snapshot.count, 1);

    watch.close();
}

#[tokio::test]
async fn watch_gives_up_when_the_feed_ends_twice_in_a_row() {
    let (store, coordinator, _) = setup("user-i1").await;
    let mut watch = coordinator.watch().await.unwrap();

    store.end_subscriptions();
    assert!(timeout(Duration::from_millis(50), watch.next()).await.is_err());

    store.end_subscriptions();
    let outcome = timeout(WAIT, watch.next()).await.expect("watch hung");

    assert!(outcome.is_none());
    assert!(!watch.is_open());
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn observe_without_identity_never_reports_liked() {
    let review_id = Uuid::new_v4();
    let me = identity("user-i1");
    let likes = vec![like_from(review_id, "Asha", &me)];

    let anonymous = LikeSnapshot::observe(review_id, &likes, None);
    assert_eq!(anonymous.count, 1);
    assert!(!anonymous.has_liked);

    let mine = LikeSnapshot::observe(review_id, &likes, Some(&me));
    assert!(mine.has_liked);
    assert_eq!(mine.phase, LikePhase::Liked);
}

#[test]
fn server_messages_are_tagged() {
    let message = LikeServerMessage::from_error(&AppError::field("userName", "Please enter your name"));
    let json = serde_json::to_value(&message).unwrap();

    assert_eq!(json["type"], "error");
    assert_eq!(json["fields"]["userName"], "Please enter your name");

    let pong = serde_json::to_value(LikeServerMessage::Pong { ts: 1, pong: 2 }).unwrap();
    assert_eq!(pong["type"], "pong");
}
