use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::{RecordStore, Subscription},
    errors::AppError,
    identity::ClientIdentity,
    models::{ChangeEvent, Endorser, NewReviewLike, ReviewLike},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LikePhase {
    Unliked,
    Liking,
    Liked,
}

/// Like state of one review as seen by one identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeSnapshot {
    pub review_id: Uuid,
    pub count: usize,
    pub has_liked: bool,
    pub phase: LikePhase,
    pub endorsers: Vec<Endorser>,
    /// Name typed for a like that did not go through, kept for the retry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_name: Option<String>,
}

impl LikeSnapshot {
    /// Read-only view for a caller that may not have an identity yet.
    pub fn observe(review_id: Uuid, likes: &[ReviewLike], identity: Option<&ClientIdentity>) -> Self {
        let has_liked = identity.is_some_and(|id| likes.iter().any(|l| l.is_from(id)));

        Self {
            review_id,
            count: likes.len(),
            has_liked,
            phase: if has_liked {
                LikePhase::Liked
            } else {
                LikePhase::Unliked
            },
            endorsers: likes.iter().map(Endorser::from).collect(),
            draft_name: None,
        }
    }
}

struct LikeState {
    phase: LikePhase,
    likes: Vec<ReviewLike>,
    draft_name: Option<String>,
}

/// Drives the "helpful" endorsement of one review for one identity.
///
/// `Unliked -> Liking -> Liked` on a successful write, `Liking -> Unliked` when
/// the write fails. `Liked` is terminal: there is no un-like, and a second
/// attempt is refused before the record store is touched. While a write is in
/// flight further attempts are refused as well.
pub struct LikeCoordinator {
    store: Arc<dyn RecordStore>,
    identity: ClientIdentity,
    review_id: Uuid,
    state: Mutex<LikeState>,
}

impl LikeCoordinator {
    pub async fn load(
        store: Arc<dyn RecordStore>,
        identity: ClientIdentity,
        review_id: Uuid,
    ) -> Result<Self, AppError> {
        let likes = store.list_likes(review_id).await.map_err(|e| {
            tracing::error!("Failed to load likes for review {}: {}", review_id, e);
            e
        })?;

        let phase = if likes.iter().any(|l| l.is_from(&identity)) {
            LikePhase::Liked
        } else {
            LikePhase::Unliked
        };

        Ok(Self {
            store,
            identity,
            review_id,
            state: Mutex::new(LikeState {
                phase,
                likes,
                draft_name: None,
            }),
        })
    }

    pub fn review_id(&self) -> Uuid {
        self.review_id
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub async fn phase(&self) -> LikePhase {
        self.state.lock().await.phase
    }

    pub async fn snapshot(&self) -> LikeSnapshot {
        let state = self.state.lock().await;
        self.snapshot_of(&state)
    }

    fn snapshot_of(&self, state: &LikeState) -> LikeSnapshot {
        LikeSnapshot {
            review_id: self.review_id,
            count: state.likes.len(),
            has_liked: state.phase == LikePhase::Liked,
            phase: state.phase,
            endorsers: state.likes.iter().map(Endorser::from).collect(),
            draft_name: state.draft_name.clone(),
        }
    }

    /// Marks the review as helpful under `display_name`.
    pub async fn endorse(&self, display_name: &str) -> Result<LikeSnapshot, AppError> {
        let user_name = display_name.trim().to_string();

        {
            let mut state = self.state.lock().await;

            match state.phase {
                LikePhase::Liked => return Err(AppError::AlreadyLiked),
                LikePhase::Liking => return Err(AppError::LikeInFlight),
                LikePhase::Unliked => {}
            }

            if user_name.is_empty() {
                return Err(AppError::field("userName", "Please enter your name"));
            }

            state.draft_name = Some(user_name.clone());
            state.phase = LikePhase::Liking;
        }

        let result = self
            .store
            .insert_review_like(NewReviewLike {
                review_id: self.review_id,
                user_name,
                user_identity: self.identity.as_str().to_string(),
            })
            .await;

        let mut state = self.state.lock().await;
        match result {
            Ok(like) => {
                tracing::info!("Review {} liked by {}", self.review_id, self.identity);
                if !state.likes.iter().any(|l| l.id == like.id) {
                    state.likes.insert(0, like);
                }
                state.phase = LikePhase::Liked;
                state.draft_name = None;
                Ok(self.snapshot_of(&state))
            }
            Err(AppError::AlreadyLiked) => {
                // Another tab of the same profile got there first.
                tracing::info!(
                    "Record store already holds a like on review {} from {}",
                    self.review_id,
                    self.identity
                );
                state.phase = LikePhase::Liked;
                state.draft_name = None;
                Err(AppError::AlreadyLiked)
            }
            Err(e) => {
                tracing::error!("Error liking review {}: {}", self.review_id, e);
                // A refresh may have seen our like land from another tab meanwhile.
                if state.phase == LikePhase::Liking {
                    state.phase = LikePhase::Unliked;
                }
                Err(e)
            }
        }
    }

    /// Re-reads the like set and recomputes the count and `has_liked`.
    pub async fn refresh(&self) -> Result<LikeSnapshot, AppError> {
        let likes = self.store.list_likes(self.review_id).await.map_err(|e| {
            tracing::error!("Error fetching like data for review {}: {}", self.review_id, e);
            e
        })?;

        let mut state = self.state.lock().await;
        if likes.iter().any(|l| l.is_from(&self.identity)) {
            state.phase = LikePhase::Liked;
            state.draft_name = None;
        }
        state.likes = likes;

        Ok(self.snapshot_of(&state))
    }

    /// Applies one change notification. Events for other reviews are ignored
    /// without touching the record store.
    pub async fn reconcile(&self, event: &ChangeEvent) -> Result<Option<LikeSnapshot>, AppError> {
        if event.review_id != self.review_id {
            return Ok(None);
        }

        self.refresh().await.map(Some)
    }

    pub async fn watch(self: &Arc<Self>) -> Result<LikeWatch, AppError> {
        let subscription = self.store.subscribe(self.review_id).await?;

        Ok(LikeWatch {
            coordinator: Arc::clone(self),
            feed: Feed::Open(subscription),
            pending: None,
            restarted: false,
        })
    }
}

enum Feed {
    Open(Subscription),
    /// The stream ended and a new subscription has not been opened yet.
    Reopening,
    Closed,
}

/// Live reconciliation loop of a [`LikeCoordinator`].
///
/// Each call to [`LikeWatch::next`] waits for the next relevant change and
/// returns the refreshed snapshot. `next` is cancel safe: an event taken off
/// the feed stays pending until its refresh completes, and an interrupted
/// resubscribe is retried on the following call. The subscription is
/// released on [`LikeWatch::close`] or drop.
pub struct LikeWatch {
    coordinator: Arc<LikeCoordinator>,
    feed: Feed,
    pending: Option<ChangeEvent>,
    restarted: bool,
}

impl LikeWatch {
    pub async fn next(&mut self) -> Option<Result<LikeSnapshot, AppError>> {
        loop {
            if let Some(event) = &self.pending {
                let outcome = self.coordinator.reconcile(event).await;
                self.pending = None;

                match outcome {
                    Ok(Some(snapshot)) => return Some(Ok(snapshot)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                }
            }

            let review_id = self.coordinator.review_id;

            match &mut self.feed {
                Feed::Open(subscription) => match subscription.next().await {
                    Some(event) => {
                        self.restarted = false;
                        self.pending = Some(event);
                    }
                    None if !self.restarted => {
                        tracing::info!("Like feed for review {} ended, resubscribing", review_id);
                        self.restarted = true;
                        self.feed = Feed::Reopening;
                    }
                    None => {
                        tracing::info!("Like feed for review {} ended again, giving up", review_id);
                        self.feed = Feed::Closed;
                        return None;
                    }
                },
                Feed::Reopening => match self.coordinator.store.subscribe(review_id).await {
                    Ok(subscription) => self.feed = Feed::Open(subscription),
                    Err(e) => {
                        self.feed = Feed::Closed;
                        return Some(Err(e));
                    }
                },
                Feed::Closed => return None,
            }
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.feed, Feed::Closed)
    }

    pub fn close(self) {
        if let Feed::Open(subscription) = self.feed {
            subscription.close();
        }
    }
}
