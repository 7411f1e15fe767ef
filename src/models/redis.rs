use uuid::Uuid;

pub struct RedisKey;

impl RedisKey {
    /// Pub/sub channel carrying change events for one review's likes.
    pub fn review_likes(review_id: Uuid) -> String {
        format!("review_likes:{review_id}")
    }
}
