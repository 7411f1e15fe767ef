use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub area: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub tags: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub phone: Option<String>,
    pub timing: Option<String>,
    pub price_range: Option<String>,
    pub address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Restaurant {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            area: None,
            kind: None,
            tags: None,
            features: None,
            images: None,
            phone: None,
            timing: None,
            price_range: None,
            address: None,
            created_at: None,
        }
    }

    pub fn images(&self) -> &[String] {
        self.images.as_deref().unwrap_or_default()
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }
}

/// A restaurant as handed to the listing page, with its rating aggregates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCard {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub slug: String,
    pub average_rating: f64,
    pub display_rating: f64,
    pub review_count: usize,
}
