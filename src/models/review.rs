use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub restaurant_id: Option<Uuid>,
    pub user_name: String,
    pub rating: Option<i32>,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
    // Denormalized; the like count comes from review_likes.
    pub helpful_count: Option<i32>,
}

impl Review {
    pub fn new(restaurant_id: Uuid, rating: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            restaurant_id: Some(restaurant_id),
            user_name: String::new(),
            rating: Some(rating),
            comment: String::new(),
            created_at: None,
            helpful_count: None,
        }
    }

    /// The rating when it lies in the 1..=5 star range.
    pub fn stars(&self) -> Option<i32> {
        self.rating.filter(|r| (1..=5).contains(r))
    }
}
