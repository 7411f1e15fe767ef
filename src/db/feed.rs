use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use futures::StreamExt;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::{
    db::Subscription,
    errors::AppError,
    models::{ChangeEvent, redis::RedisKey},
};

pub type RedisClient = Pool<RedisConnectionManager>;

/// Redis pub/sub transport for `review_likes` change events.
///
/// Publishing goes through the pooled connections; every subscription opens
/// its own pub/sub connection, which is closed when the subscription drops.
#[derive(Clone)]
pub struct ChangeFeed {
    client: redis::Client,
    pool: RedisClient,
}

impl ChangeFeed {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url)?;
        let manager = RedisConnectionManager::new(redis_url)?;
        let pool = Pool::builder().build(manager).await?;

        Ok(Self { client, pool })
    }

    pub async fn publish(&self, event: &ChangeEvent) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;

        let payload =
            serde_json::to_string(event).map_err(|e| AppError::Serialization(e.to_string()))?;
        let channel = RedisKey::review_likes(event.review_id);

        let receivers: i64 = conn.publish(&channel, payload).await?;
        tracing::debug!("Published {:?} on {} to {} listeners", event.kind, channel, receivers);

        Ok(())
    }

    pub async fn subscribe(&self, review_id: Uuid) -> Result<Subscription, AppError> {
        let channel = RedisKey::review_likes(review_id);

        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&channel).await?;

        let events = pubsub.into_on_message().filter_map(|msg| async move {
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Unreadable change event payload: {}", e);
                    return None;
                }
            };

            match serde_json::from_str::<ChangeEvent>(&payload) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Malformed change event: {}", e);
                    None
                }
            }
        });

        Ok(Subscription::new(review_id, events))
    }
}
