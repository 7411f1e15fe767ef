use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::AppError,
    identity::{Identity, MaybeIdentity},
    likes::{LikeCoordinator, LikeSnapshot},
    state::AppState,
};

pub async fn get_likes_handler(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    MaybeIdentity(identity): MaybeIdentity,
) -> Result<Json<LikeSnapshot>, AppError> {
    let likes = state.store.list_likes(review_id).await.map_err(|e| {
        tracing::error!("Error fetching like data: {}", e);
        e
    })?;

    Ok(Json(LikeSnapshot::observe(
        review_id,
        &likes,
        identity.as_ref(),
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikePayload {
    pub user_name: String,
}

pub async fn like_review_handler(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    Identity(identity): Identity,
    Json(payload): Json<LikePayload>,
) -> Result<Json<LikeSnapshot>, AppError> {
    let coordinator = LikeCoordinator::load(state.store.clone(), identity, review_id).await?;
    let snapshot = coordinator.endorse(&payload.user_name).await?;

    Ok(Json(snapshot))
}
