use serde::{Deserialize, Serialize};

use crate::{
    errors::{AppError, FieldErrors},
    likes::LikeSnapshot,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LikeClientMessage {
    #[serde(rename_all = "camelCase")]
    Endorse { user_name: String },
    Ping { ts: u64 },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LikeServerMessage {
    Snapshot {
        snapshot: LikeSnapshot,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        fields: Option<FieldErrors>,
    },
    Pong {
        ts: u64,
        pong: u64,
    },
}

impl LikeServerMessage {
    pub fn from_error(error: &AppError) -> Self {
        let (_, message) = error.to_response();
        let fields = match error {
            AppError::Validation(fields) => Some(fields.clone()),
            _ => None,
        };

        LikeServerMessage::Error { message, fields }
    }
}
