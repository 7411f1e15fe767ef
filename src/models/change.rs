use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row change on `review_likes`, as pushed by the change feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub review_id: Uuid,
    pub like_id: Option<Uuid>,
}

impl ChangeEvent {
    pub fn inserted(review_id: Uuid, like_id: Uuid) -> Self {
        Self {
            kind: ChangeKind::Insert,
            review_id,
            like_id: Some(like_id),
        }
    }
}
