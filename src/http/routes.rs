use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    http::handlers::{
        alive_handler, contact_reply_handler, explore_handler, get_likes_handler, like_review_handler,
        list_plans_handler, new_identity_handler, plan_contact_handler,
        restaurant_detail_handler, submit_contact_handler,
    },
    state::AppState,
};

pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .route("/alive", get(alive_handler))
        .route("/identity", get(new_identity_handler))
        .route("/restaurants", get(explore_handler))
        .route("/restaurants/{slug}", get(restaurant_detail_handler))
        .route(
            "/reviews/{review_id}/likes",
            get(get_likes_handler).post(like_review_handler),
        )
        .route("/contact", post(submit_contact_handler))
        .route("/contact/reply", post(contact_reply_handler))
        .route("/partnership/plans", get(list_plans_handler))
        .route("/partnership/plans/{plan}/contact", get(plan_contact_handler))
        .with_state(state)
}
