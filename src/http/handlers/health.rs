use axum::Json;
use serde_json::{Value, json};

use crate::identity::ClientIdentity;

pub async fn alive_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Fresh pseudo-identity for a browser profile that has none stored yet.
pub async fn new_identity_handler() -> Json<Value> {
    let identity = ClientIdentity::generate();
    tracing::debug!("Issued client identity {}", identity);

    Json(json!({ "identity": identity }))
}
