//! Record store access.
//!
//! The hosted database owns every persisted entity. [`RecordStore`] is the
//! seam the rest of the crate talks to; the backends differ only in how they
//! reach the data:
//!
//! - [`PgStore`]: direct Postgres connection through `sqlx`
//! - [`RestStore`]: the hosted REST gateway (PostgREST dialect) over `reqwest`
//! - [`MemoryStore`]: in-process vectors, for tests and local runs
//!
//! Change notifications for `review_likes` travel over Redis pub/sub
//! ([`ChangeFeed`]) for the two remote backends, one channel per review.

pub mod feed;
pub mod memory;
pub mod postgres;
pub mod rest;

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::{Stream, StreamExt, stream::BoxStream};
use uuid::Uuid;

use crate::{
    errors::AppError,
    forms::ValidContact,
    models::{ChangeEvent, NewReviewLike, Restaurant, Review, ReviewLike},
};

pub use feed::ChangeFeed;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use rest::RestStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All restaurants, newest first.
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, AppError>;

    /// Reviews, newest first, optionally narrowed to one restaurant.
    async fn list_reviews(&self, restaurant_id: Option<Uuid>) -> Result<Vec<Review>, AppError>;

    /// Likes of one review, newest first.
    async fn list_likes(&self, review_id: Uuid) -> Result<Vec<ReviewLike>, AppError>;

    /// Fails with [`AppError::AlreadyLiked`] when the store already holds a
    /// like for the same review and identity.
    async fn insert_review_like(&self, like: NewReviewLike) -> Result<ReviewLike, AppError>;

    async fn insert_contact_submission(&self, contact: ValidContact) -> Result<(), AppError>;

    /// Change events on `review_likes` scoped to one review.
    async fn subscribe(&self, review_id: Uuid) -> Result<Subscription, AppError>;
}

/// Live change events for one review. Dropping the handle releases the
/// underlying listener.
pub struct Subscription {
    review_id: Uuid,
    events: BoxStream<'static, ChangeEvent>,
}

impl Subscription {
    pub fn new<S>(review_id: Uuid, events: S) -> Self
    where
        S: Stream<Item = ChangeEvent> + Send + 'static,
    {
        tracing::debug!("Opened like subscription for review {}", review_id);
        Self {
            review_id,
            events: events.boxed(),
        }
    }

    pub fn review_id(&self) -> Uuid {
        self.review_id
    }

    /// Stops listening. The listener itself is released when the handle
    /// drops, which this does right away.
    pub fn close(self) {
        tracing::debug!("Closing like subscription for review {}", self.review_id);
    }
}

impl Stream for Subscription {
    type Item = ChangeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_next_unpin(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        tracing::debug!("Released like subscription for review {}", self.review_id);
    }
}
