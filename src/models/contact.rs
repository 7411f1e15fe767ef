use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContactSubmission {
    pub full_name: String,
    pub email: Option<String>,
    pub restaurant_name: String,
    pub contact_number: String,
    pub how_found_us: String,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
}
