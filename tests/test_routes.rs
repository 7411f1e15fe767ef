use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chewzy_be::{
    config::Config,
    create_app,
    db::MemoryStore,
    mail::MemoryMailer,
    models::{Restaurant, Review},
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn seeded_store() -> Arc<MemoryStore> {
    let mut alpha = Restaurant::new(Uuid::new_v4(), "Alpha Cafe");
    alpha.area = Some("North".into());
    let reviews = vec![Review::new(alpha.id, 4), Review::new(alpha.id, 2)];

    Arc::new(MemoryStore::with_data(vec![alpha], reviews))
}

fn app(state: AppState) -> Router {
    create_app(state, &Config::default())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let app = app(AppState::new(seeded_store()));

    let (status, body) = send(app, get("/restaurants/missing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Restaurant not found: missing");
}

#[tokio::test]
async fn detail_carries_rating_and_placeholder_cover() {
    let app = app(AppState::new(seeded_store()));

    let (status, body) = send(app, get("/restaurants/alpha-cafe")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restaurant"]["name"], "Alpha Cafe");
    assert_eq!(body["rating"]["average"], 3.0);
    assert_eq!(body["rating"]["reviewCount"], 2);
    assert_eq!(body["gallery"]["cover"], "/placeholder.svg");
}

#[tokio::test]
async fn explore_filters_and_rejects_unknown_thresholds() {
    let store = seeded_store();

    let (status, _) = send(
        app(AppState::new(store.clone())),
        get("/restaurants?minRating=3.5"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app(AppState::new(store.clone())),
        get("/restaurants?query=alpha&minRating=3&sort=rating"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["restaurants"][0]["slug"], "alpha-cafe");
    assert_eq!(body["areas"], json!(["North"]));

    let (_, body) = send(app(AppState::new(store)), get("/restaurants?minRating=4")).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn invalid_contact_returns_field_errors() {
    let app = app(AppState::new(seeded_store()));

    let (status, body) = send(app, post_json("/contact", json!({ "email": "nope" }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Please fill in all required fields.");
    assert_eq!(body["fields"]["email"], "Please enter a valid email");
    assert_eq!(body["fields"]["fullName"], "Full name is required");
}

#[tokio::test]
async fn like_flow_over_http() {
    let store = seeded_store();
    let review_id = Uuid::new_v4();
    let uri = format!("/reviews/{review_id}/likes");

    let (status, _) = send(
        app(AppState::new(store.clone())),
        post_json(&uri, json!({ "userName": "Asha" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let liked = || {
        Request::builder()
            .method("POST")
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-client-identity", "user-i1")
            .body(Body::from(json!({ "userName": "Asha" }).to_string()))
            .unwrap()
    };

    let (status, body) = send(app(AppState::new(store.clone())), liked()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasLiked"], true);
    assert_eq!(body["count"], 1);

    let (status, _) = send(app(AppState::new(store.clone())), liked()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(app(AppState::new(store)), get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasLiked"], false);
    assert_eq!(body["endorsers"][0]["userName"], "Asha");
}

#[tokio::test]
async fn contact_reply_needs_credentials_and_fields() {
    let reply = json!({ "email": "meera@spicegarden.in", "text": "Thanks!" });

    let (status, body) = send(
        app(AppState::new(seeded_store())),
        post_json("/contact/reply", reply.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "SMTP credentials not set");

    let mailer = Arc::new(MemoryMailer::new());
    let state = AppState::new(seeded_store()).with_mailer(mailer.clone());

    let (status, _) = send(
        app(state.clone()),
        post_json("/contact/reply", json!({ "email": "meera@spicegarden.in" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(app(state), post_json("/contact/reply", reply)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email sent successfully");

    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Thanks for Contacting Chewzy");
}

#[tokio::test]
async fn unknown_route_falls_back_to_404() {
    let app = app(AppState::new(seeded_store()));

    let (status, _) = send(app, get("/nowhere")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
