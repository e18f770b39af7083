//! Transport used by the pool to open connections.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use url::form_urlencoded::byte_serialize;

use super::{Command, Connection, ConnectionDriver, ConnectionEvent, ConnectionState, Namespace};

/// Opens a connection for a namespace.
///
/// `open` returns immediately with a handle in the `Connecting` state; the
/// implementation finishes the handshake in the background.
pub trait Connector: Send + Sync {
    fn open(&self, namespace: &Namespace, url: &str) -> Connection;
}

/// WebSocket-only transport (no fallback negotiation).
///
/// The namespace is sent as the `namespace` query parameter. `open` spawns a
/// tokio task, so it must be called from within a runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn open(&self, namespace: &Namespace, url: &str) -> Connection {
        let (connection, driver) = Connection::channel(namespace.clone(), url);
        let endpoint = endpoint_url(url, namespace);
        tokio::spawn(run_websocket(endpoint, driver));
        connection
    }
}

/// Append the form-encoded namespace query parameter to `url`.
pub fn endpoint_url(url: &str, namespace: &Namespace) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    let encoded: String = byte_serialize(namespace.as_str().as_bytes()).collect();
    format!("{}{}namespace={}", url, separator, encoded)
}

async fn run_websocket(endpoint: String, mut driver: ConnectionDriver) {
    // Texts sent while connecting, flushed once open
    let mut pending = Vec::new();

    let handshake = connect_async(endpoint.as_str());
    tokio::pin!(handshake);

    // The pool may close the handle before the handshake completes
    let ws_stream = loop {
        tokio::select! {
            result = &mut handshake => match result {
                Ok((ws_stream, _response)) => break ws_stream,
                Err(e) => {
                    tracing::warn!("Failed to connect to {}: {}", endpoint, e);
                    driver.emit(ConnectionEvent::Error(e.to_string()));
                    driver.set_state(ConnectionState::Failed);
                    return;
                }
            },
            command = driver.next_command() => match command {
                Some(Command::Text(text)) => pending.push(text),
                Some(Command::Close) | None => {
                    tracing::debug!(
                        "Closed '{}' before the handshake with {} finished",
                        driver.namespace(),
                        endpoint
                    );
                    driver.set_state(ConnectionState::Closed);
                    driver.emit(ConnectionEvent::Closed);
                    return;
                }
            },
        }
    };

    tracing::info!(
        "Connected to {} for namespace '{}'",
        endpoint,
        driver.namespace()
    );
    driver.set_state(ConnectionState::Open);
    driver.emit(ConnectionEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    for text in pending {
        if let Err(e) = write.send(Message::Text(text.into())).await {
            tracing::warn!("Failed to send on '{}': {}", driver.namespace(), e);
            driver.emit(ConnectionEvent::Error(e.to_string()));
            driver.set_state(ConnectionState::Closed);
            driver.emit(ConnectionEvent::Closed);
            return;
        }
    }

    loop {
        tokio::select! {
            command = driver.next_command() => match command {
                Some(Command::Text(text)) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        tracing::warn!("Failed to send on '{}': {}", driver.namespace(), e);
                        driver.emit(ConnectionEvent::Error(e.to_string()));
                        break;
                    }
                }
                // Every handle dropped counts as a close request
                Some(Command::Close) | None => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        tracing::debug!("Close frame not delivered on '{}': {}", driver.namespace(), e);
                    }
                    break;
                }
            },
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    driver.emit(ConnectionEvent::Text(text.to_string()));
                }
                Some(Ok(Message::Binary(data))) => {
                    driver.emit(ConnectionEvent::Binary(data.to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed the connection for '{}'", driver.namespace());
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error on '{}': {}", driver.namespace(), e);
                    driver.emit(ConnectionEvent::Error(e.to_string()));
                    break;
                }
            },
        }
    }

    driver.set_state(ConnectionState::Closed);
    driver.emit(ConnectionEvent::Closed);
}
