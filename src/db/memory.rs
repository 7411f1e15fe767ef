use std::{
    sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use futures::{StreamExt, stream};
use tokio::sync::{RwLock, broadcast, watch};
use uuid::Uuid;

use crate::{
    db::{RecordStore, Subscription},
    errors::AppError,
    forms::ValidContact,
    models::{ChangeEvent, ChangeKind, ContactSubmission, NewReviewLike, Restaurant, Review, ReviewLike},
};

const EVENT_BUFFER: usize = 100;

/// In-process record store.
///
/// Keeps insertion order and sorts on read the way the hosted store does.
/// Counts store calls, can be told to fail or slow down like fetches and
/// writes, and can end every open subscription. The like flow tests lean on
/// all of it.
pub struct MemoryStore {
    restaurants: RwLock<Vec<Restaurant>>,
    reviews: RwLock<Vec<Review>>,
    likes: RwLock<Vec<ReviewLike>>,
    contacts: RwLock<Vec<ContactSubmission>>,
    events: broadcast::Sender<ChangeEvent>,
    feed_ended: watch::Sender<()>,
    fetch_delay_ms: AtomicU64,
    write_delay_ms: AtomicU64,
    like_fetches: AtomicUsize,
    like_inserts: AtomicUsize,
    fail_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_data(Vec::new(), Vec::new())
    }

    pub fn with_data(restaurants: Vec<Restaurant>, reviews: Vec<Review>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (feed_ended, _) = watch::channel(());
        Self {
            restaurants: RwLock::new(restaurants),
            reviews: RwLock::new(reviews),
            likes: RwLock::new(Vec::new()),
            contacts: RwLock::new(Vec::new()),
            events,
            feed_ended,
            fetch_delay_ms: AtomicU64::new(0),
            write_delay_ms: AtomicU64::new(0),
            like_fetches: AtomicUsize::new(0),
            like_inserts: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub async fn add_restaurant(&self, restaurant: Restaurant) {
        self.restaurants.write().await.push(restaurant);
    }

    pub async fn add_review(&self, review: Review) {
        self.reviews.write().await.push(review);
    }

    /// Stores a like as another viewer would, and announces it.
    pub async fn add_like(&self, like: ReviewLike) {
        let event = ChangeEvent::inserted(like.review_id, like.id);
        self.likes.write().await.push(like);
        self.notify(event);
    }

    /// Removes a like out-of-band and announces the deletion.
    pub async fn remove_like(&self, like_id: Uuid) {
        let removed = {
            let mut likes = self.likes.write().await;
            likes
                .iter()
                .position(|l| l.id == like_id)
                .map(|pos| likes.remove(pos))
        };

        if let Some(like) = removed {
            self.notify(ChangeEvent {
                kind: ChangeKind::Delete,
                review_id: like.review_id,
                like_id: Some(like.id),
            });
        }
    }

    pub fn notify(&self, event: ChangeEvent) {
        // No receivers is fine: nobody is watching that review.
        let _ = self.events.send(event);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay applied to every like fetch.
    pub fn set_fetch_delay(&self, delay: Duration) {
        self.fetch_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Delay applied to every like insert, before the write is attempted.
    pub fn set_write_delay(&self, delay: Duration) {
        self.write_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Ends every subscription opened so far, as a dropped connection would.
    pub fn end_subscriptions(&self) {
        self.feed_ended.send_replace(());
    }

    pub fn like_fetch_count(&self) -> usize {
        self.like_fetches.load(Ordering::SeqCst)
    }

    pub fn like_insert_count(&self) -> usize {
        self.like_inserts.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub async fn contact_submissions(&self) -> Vec<ContactSubmission> {
        self.contacts.read().await.clone()
    }

    async fn pause(delay_ms: &AtomicU64) {
        let delay = delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::NetworkFailure("Record store unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, AppError> {
        let mut restaurants = self.restaurants.read().await.clone();
        restaurants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(restaurants)
    }

    async fn list_reviews(&self, restaurant_id: Option<Uuid>) -> Result<Vec<Review>, AppError> {
        let mut reviews: Vec<Review> = self
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| restaurant_id.is_none() || r.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn list_likes(&self, review_id: Uuid) -> Result<Vec<ReviewLike>, AppError> {
        self.like_fetches.fetch_add(1, Ordering::SeqCst);
        Self::pause(&self.fetch_delay_ms).await;

        let mut likes: Vec<ReviewLike> = self
            .likes
            .read()
            .await
            .iter()
            .filter(|l| l.review_id == review_id)
            .cloned()
            .collect();
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(likes)
    }

    async fn insert_review_like(&self, like: NewReviewLike) -> Result<ReviewLike, AppError> {
        self.like_inserts.fetch_add(1, Ordering::SeqCst);
        Self::pause(&self.write_delay_ms).await;
        self.check_writable()?;

        let stored = {
            let mut likes = self.likes.write().await;

            if likes
                .iter()
                .any(|l| l.review_id == like.review_id && l.user_identity == like.user_identity)
            {
                return Err(AppError::AlreadyLiked);
            }

            let stored = ReviewLike {
                id: Uuid::new_v4(),
                review_id: like.review_id,
                user_name: like.user_name,
                user_identity: like.user_identity,
                created_at: Some(Utc::now()),
            };
            likes.push(stored.clone());
            stored
        };

        self.notify(ChangeEvent::inserted(stored.review_id, stored.id));
        Ok(stored)
    }

    async fn insert_contact_submission(&self, contact: ValidContact) -> Result<(), AppError> {
        self.check_writable()?;

        self.contacts.write().await.push(ContactSubmission {
            full_name: contact.full_name,
            email: Some(contact.email),
            restaurant_name: contact.restaurant_name,
            contact_number: contact.contact_number,
            how_found_us: contact.how_found_us,
            message: contact.message,
            created_at: Some(Utc::now()),
        });
        Ok(())
    }

    async fn subscribe(&self, review_id: Uuid) -> Result<Subscription, AppError> {
        let receiver = self.events.subscribe();
        let ended = self.feed_ended.subscribe();

        let events = stream::unfold((receiver, ended), |(mut receiver, mut ended)| async move {
            loop {
                tokio::select! {
                    _ = ended.changed() => return None,
                    received = receiver.recv() => match received {
                        Ok(event) => return Some((event, (receiver, ended))),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("Like subscription lagged, skipped {} events", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    },
                }
            }
        })
        .filter(move |event| futures::future::ready(event.review_id == review_id));

        Ok(Subscription::new(review_id, events))
    }
}
