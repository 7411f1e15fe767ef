use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{
    db::{ChangeFeed, RecordStore, Subscription},
    errors::AppError,
    forms::ValidContact,
    models::{ChangeEvent, NewReviewLike, Restaurant, Review, ReviewLike},
};

const MAX_CONNECTIONS: u32 = 10;

pub struct PgStore {
    postgres: PgPool,
    feed: ChangeFeed,
}

impl PgStore {
    pub async fn connect(database_url: &str, feed: ChangeFeed) -> Result<Self, AppError> {
        let postgres = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to Postgres: {}", e)))?;

        Ok(Self { postgres, feed })
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, AppError> {
        let restaurants = sqlx::query_as::<_, Restaurant>(
            "SELECT id, name, description, area, type, tags, features, images,
				phone, timing, price_range, address, created_at
			FROM restaurants
			ORDER BY created_at DESC NULLS LAST",
        )
        .fetch_all(&self.postgres)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch restaurants: {}", e)))?;

        Ok(restaurants)
    }

    async fn list_reviews(&self, restaurant_id: Option<Uuid>) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT id, restaurant_id, user_name, rating, comment, created_at, helpful_count
			FROM reviews
			WHERE $1::uuid IS NULL OR restaurant_id = $1
			ORDER BY created_at DESC NULLS LAST",
        )
        .bind(restaurant_id)
        .fetch_all(&self.postgres)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch reviews: {}", e)))?;

        Ok(reviews)
    }

    async fn list_likes(&self, review_id: Uuid) -> Result<Vec<ReviewLike>, AppError> {
        let likes = sqlx::query_as::<_, ReviewLike>(
            "SELECT id, review_id, user_name, user_identity, created_at
			FROM review_likes
			WHERE review_id = $1
			ORDER BY created_at DESC NULLS LAST",
        )
        .bind(review_id)
        .fetch_all(&self.postgres)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch likes: {}", e)))?;

        Ok(likes)
    }

    async fn insert_review_like(&self, like: NewReviewLike) -> Result<ReviewLike, AppError> {
        // Unique (review_id, user_identity) index.
        let stored = sqlx::query_as::<_, ReviewLike>(
            "INSERT INTO review_likes (review_id, user_name, user_identity)
			VALUES ($1, $2, $3)
			RETURNING id, review_id, user_name, user_identity, created_at",
        )
        .bind(like.review_id)
        .bind(&like.user_name)
        .bind(&like.user_identity)
        .fetch_one(&self.postgres)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::AlreadyLiked,
            _ => AppError::DatabaseError(format!("Failed to store like: {}", e)),
        })?;

        if let Err(e) = self
            .feed
            .publish(&ChangeEvent::inserted(stored.review_id, stored.id))
            .await
        {
            tracing::warn!("Like {} stored but change event not published: {}", stored.id, e);
        }

        Ok(stored)
    }

    async fn insert_contact_submission(&self, contact: ValidContact) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO contact_submissions
				(full_name, email, restaurant_name, contact_number, how_found_us, message)
			VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&contact.full_name)
        .bind(&contact.email)
        .bind(&contact.restaurant_name)
        .bind(&contact.contact_number)
        .bind(&contact.how_found_us)
        .bind(&contact.message)
        .execute(&self.postgres)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to store contact submission: {}", e))
        })?;

        Ok(())
    }

    async fn subscribe(&self, review_id: Uuid) -> Result<Subscription, AppError> {
        self.feed.subscribe(review_id).await
    }
}
