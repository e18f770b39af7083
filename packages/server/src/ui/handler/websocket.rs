//! WebSocket subscription handler.
//!
//! A client subscribes to one namespace. It receives the table's current round
//! right away as `round-started`, then every event published afterwards.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use roundfeed_shared::wire::RoundEvent;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::{domain::PushChannel, ui::state::AppState, usecase::GetRoundError};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub namespace: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubscribeQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let namespace = subscribable_namespace(&state, &query.namespace)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, namespace)))
}

/// Only configured tables can be subscribed to; each subscribed namespace
/// holds a broadcast channel for the life of the server.
fn subscribable_namespace(state: &AppState, raw: &str) -> Result<String, StatusCode> {
    let namespace = raw.trim();
    if namespace.is_empty() {
        tracing::warn!("Rejecting subscription without a namespace");
        return Err(StatusCode::BAD_REQUEST);
    }
    if !state.has_table(namespace) {
        tracing::warn!("Rejecting subscription to unknown table '{}'", namespace);
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(namespace.to_string())
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, namespace: String) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before reading the current round so nothing falls in between
    let mut channel: PushChannel = state.pusher.subscribe(&namespace).await;
    tracing::info!("Subscriber joined '{}'", namespace);

    match state.get_round_usecase.current(&namespace).await {
        Ok(round) => match (RoundEvent::RoundStarted { round }).to_json() {
            Ok(json) => {
                if let Err(e) = sender.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send current round of '{}': {}", namespace, e);
                    return;
                }
            }
            Err(e) => tracing::error!("Failed to encode current round: {}", e),
        },
        Err(GetRoundError::RoundNotFound) => {
            tracing::debug!("No round yet on '{}'", namespace);
        }
        Err(e) => tracing::warn!("Failed to read current round of '{}': {}", namespace, e),
    }

    loop {
        tokio::select! {
            event = channel.recv() => match event {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Subscriber of '{}' lagged by {} event(s)", namespace, skipped);
                }
                Err(RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Subscriber of '{}' requested close", namespace);
                    break;
                }
                Some(Ok(Message::Ping(_))) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::debug!("Received ping");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error on '{}': {}", namespace, e);
                    break;
                }
            },
        }
    }

    tracing::info!("Subscriber left '{}'", namespace);
}
