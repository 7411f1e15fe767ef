use axum::{
    extract::{
        ConnectInfo, Path, Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt, stream::SplitSink};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use uuid::Uuid;

use crate::{
    errors::AppError,
    identity::ClientIdentity,
    likes::LikeCoordinator,
    models::{LikeClientMessage, LikeServerMessage},
    state::AppState,
};

#[derive(Deserialize)]
pub struct LikeWsQuery {
    identity: String,
}

pub async fn review_likes_ws_handler(
    ws: WebSocketUpgrade,
    Path(review_id): Path<Uuid>,
    Query(query): Query<LikeWsQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("New like feed connection from {} for review {}", addr, review_id);

    let identity = ClientIdentity::parse(&query.identity)?;
    let coordinator = LikeCoordinator::load(state.store.clone(), identity, review_id).await?;

    Ok(ws.on_upgrade(move |socket| handle_like_socket(socket, Arc::new(coordinator))))
}

async fn handle_like_socket(socket: WebSocket, coordinator: Arc<LikeCoordinator>) {
    let (mut sender, mut receiver) = socket.split();
    let review_id = coordinator.review_id();

    let mut watch = match coordinator.watch().await {
        Ok(watch) => watch,
        Err(e) => {
            tracing::error!("Failed to subscribe to likes of review {}: {}", review_id, e);
            let _ = send_message(&mut sender, &LikeServerMessage::from_error(&e)).await;
            return;
        }
    };

    let initial = LikeServerMessage::Snapshot {
        snapshot: coordinator.snapshot().await,
    };
    if send_message(&mut sender, &initial).await.is_err() {
        watch.close();
        return;
    }

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let Some(Ok(message)) = incoming else {
                    break;
                };

                match message {
                    Message::Text(text) => {
                        let reply = handle_client_message(&coordinator, &text).await;
                        if send_message(&mut sender, &reply).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            update = watch.next() => match update {
                Some(Ok(snapshot)) => {
                    if send_message(&mut sender, &LikeServerMessage::Snapshot { snapshot })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!("Like refresh for review {} failed: {}", review_id, e);
                }
                None => {
                    tracing::info!("Like feed for review {} ended", review_id);
                    break;
                }
            },
        }
    }

    watch.close();
    tracing::info!("Like socket for review {} closed", review_id);
}

async fn handle_client_message(coordinator: &LikeCoordinator, text: &str) -> LikeServerMessage {
    match serde_json::from_str::<LikeClientMessage>(text) {
        Ok(LikeClientMessage::Endorse { user_name }) => {
            match coordinator.endorse(&user_name).await {
                Ok(snapshot) => LikeServerMessage::Snapshot { snapshot },
                Err(e) => LikeServerMessage::from_error(&e),
            }
        }
        Ok(LikeClientMessage::Ping { ts }) => {
            let now = Utc::now().timestamp_millis() as u64;
            LikeServerMessage::Pong {
                ts,
                pong: now.saturating_sub(ts),
            }
        }
        Err(e) => {
            tracing::warn!("Invalid like message: {}", e);
            LikeServerMessage::Error {
                message: "Invalid message".to_string(),
                fields: None,
            }
        }
    }
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &LikeServerMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize like message: {}", e);
            return Ok(());
        }
    };

    sender.send(Message::Text(json.into())).await
}
