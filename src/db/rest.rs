use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    db::{ChangeFeed, RecordStore, Subscription},
    errors::AppError,
    forms::ValidContact,
    models::{ChangeEvent, NewReviewLike, Restaurant, Review, ReviewLike},
};

const NEWEST_FIRST: &str = "created_at.desc.nullslast";

/// Record store reached through the hosted REST gateway.
pub struct RestStore {
    http: Client,
    base_url: String,
    feed: ChangeFeed,
}

impl RestStore {
    pub fn new(project_url: &str, anon_key: &str, feed: ChangeFeed) -> Result<Self, AppError> {
        let key = HeaderValue::from_str(anon_key)
            .map_err(|_| AppError::EnvError("SUPABASE_ANON_KEY is not a valid header".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {anon_key}"))
            .map_err(|_| AppError::EnvError("SUPABASE_ANON_KEY is not a valid header".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            feed,
        })
    }

    fn table(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, AppError> {
        let res = send(request, what).await?;

        res.json::<T>().await.map_err(|e| {
            tracing::error!("Invalid {} payload from record store: {}", what, e);
            AppError::Deserialization(format!("Invalid {what} payload: {e}"))
        })
    }
}

async fn send(request: RequestBuilder, what: &str) -> Result<Response, AppError> {
    let res = request.send().await.map_err(|e| {
        tracing::error!("Record store request for {} failed: {}", what, e);
        AppError::from(e)
    })?;

    match res.status() {
        status if status.is_success() => Ok(res),
        StatusCode::CONFLICT => Err(AppError::AlreadyLiked),
        status => {
            let body = res.text().await.unwrap_or_default();
            tracing::error!("Record store rejected {} ({}): {}", what, status, body);
            Err(AppError::NetworkFailure(format!(
                "Record store rejected {what}: {status}"
            )))
        }
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, AppError> {
        let request = self
            .http
            .get(self.table("restaurants"))
            .query(&[("select", "*"), ("order", NEWEST_FIRST)]);

        self.fetch(request, "restaurants").await
    }

    async fn list_reviews(&self, restaurant_id: Option<Uuid>) -> Result<Vec<Review>, AppError> {
        let mut request = self
            .http
            .get(self.table("reviews"))
            .query(&[("select", "*"), ("order", NEWEST_FIRST)]);

        if let Some(id) = restaurant_id {
            request = request.query(&[("restaurant_id", format!("eq.{id}"))]);
        }

        self.fetch(request, "reviews").await
    }

    async fn list_likes(&self, review_id: Uuid) -> Result<Vec<ReviewLike>, AppError> {
        let request = self.http.get(self.table("review_likes")).query(&[
            ("select", "*".to_string()),
            ("review_id", format!("eq.{review_id}")),
            ("order", NEWEST_FIRST.to_string()),
        ]);

        self.fetch(request, "review likes").await
    }

    async fn insert_review_like(&self, like: NewReviewLike) -> Result<ReviewLike, AppError> {
        let request = self
            .http
            .post(self.table("review_likes"))
            .header("Prefer", "return=representation")
            .json(&like);

        let rows: Vec<ReviewLike> = self.fetch(request, "review like").await?;
        let stored = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Deserialization("Insert returned no row".into()))?;

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
        let request = self
            .http
            .post(self.table("contact_submissions"))
            .header("Prefer", "return=minimal")
            .json(&contact);

        send(request, "contact submission").await?;
        Ok(())
    }

    async fn subscribe(&self, review_id: Uuid) -> Result<Subscription, AppError> {
        self.feed.subscribe(review_id).await
    }
}
