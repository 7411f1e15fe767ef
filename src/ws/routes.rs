use axum::{Router, routing::get};

use crate::{state::AppState, ws::handlers::review_likes_ws_handler};

pub fn create_ws_routes(state: AppState) -> Router {
    Router::new()
        .route("/ws/reviews/{review_id}/likes", get(review_likes_ws_handler))
        .with_state(state)
}
