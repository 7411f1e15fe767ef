use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::identity::ClientIdentity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReviewLike {
    pub id: Uuid,
    pub review_id: Uuid,
    pub user_name: String,
    pub user_identity: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl ReviewLike {
    pub fn is_from(&self, identity: &ClientIdentity) -> bool {
        self.user_identity == identity.as_str()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReviewLike {
    pub review_id: Uuid,
    pub user_name: String,
    pub user_identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endorser {
    pub user_name: String,
    pub liked_at: Option<DateTime<Utc>>,
}

impl From<&ReviewLike> for Endorser {
    fn from(like: &ReviewLike) -> Self {
        Self {
            user_name: like.user_name.clone(),
            liked_at: like.created_at,
        }
    }
}
