//! Shared connection handle and the transport-side driver that feeds it.
//!
//! A [`Connection`] is what consumers hold: they can read its state, subscribe
//! to its events and send text. Only the pool can close it. The paired
//! [`ConnectionDriver`] is owned by the transport task.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, mpsc, watch};

use crate::error::ClientError;

use super::Namespace;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Failed,
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed)
    }
}

/// Events surfaced by the transport, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Text(String),
    Binary(Vec<u8>),
    Closed,
    Error(String),
}

/// Outbound instruction from the handle to the transport task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Text(String),
    Close,
}

pub struct Connection {
    namespace: Namespace,
    url: String,
    state: watch::Receiver<ConnectionState>,
    events: broadcast::Sender<ConnectionEvent>,
    commands: mpsc::UnboundedSender<Command>,
    last_text: Arc<Mutex<Option<String>>>,
}

/// Transport side of a [`Connection`].
pub struct ConnectionDriver {
    namespace: Namespace,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<ConnectionEvent>,
    commands: mpsc::UnboundedReceiver<Command>,
    last_text: Arc<Mutex<Option<String>>>,
}

impl Connection {
    /// Create a handle in the `Connecting` state together with its driver.
    pub fn channel(namespace: Namespace, url: impl Into<String>) -> (Connection, ConnectionDriver) {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let last_text = Arc::new(Mutex::new(None));

        let connection = Connection {
            namespace: namespace.clone(),
            url: url.into(),
            state: state_rx,
            events: events.clone(),
            commands: command_tx,
            last_text: last_text.clone(),
        };
        let driver = ConnectionDriver {
            namespace,
            state: state_tx,
            events,
            commands: command_rx,
            last_text,
        };
        (connection, driver)
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    /// Most recent text frame received, for consumers that attach late.
    pub fn last_text(&self) -> Option<String> {
        self.last_text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait until the connection leaves `Connecting`.
    pub async fn wait_open(&self) -> Result<(), ClientError> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|state| *state != ConnectionState::Connecting)
            .await
            .map(|state| *state)
            .unwrap_or(ConnectionState::Closed);

        match settled {
            ConnectionState::Open => Ok(()),
            ConnectionState::Failed => Err(ClientError::ConnectionError(format!(
                "failed to connect to {}",
                self.url
            ))),
            ConnectionState::Closed | ConnectionState::Connecting => Err(
                ClientError::ConnectionClosed(self.namespace.as_str().to_string()),
            ),
        }
    }

    /// Queue a text frame. Frames queued while connecting are sent once open.
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), ClientError> {
        let closed = || ClientError::ConnectionClosed(self.namespace.as_str().to_string());
        if self.state().is_terminal() {
            return Err(closed());
        }
        self.commands
            .send(Command::Text(text.into()))
            .map_err(|_| closed())
    }

    pub(crate) fn close(&self) {
        // The transport task may already be gone
        let _ = self.commands.send(Command::Close);
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("namespace", &self.namespace)
            .field("url", &self.url)
            .field("state", &self.state())
            .finish()
    }
}

impl ConnectionDriver {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    /// Publish an event to every current subscriber.
    pub fn emit(&self, event: ConnectionEvent) {
        if let ConnectionEvent::Text(text) = &event {
            *self.last_text.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.clone());
        }
        // No subscribers is not an error
        let _ = self.events.send(event);
    }

    /// Next outbound command; `None` once every handle is gone.
    pub async fn next_command(&mut self) -> Option<Command> {
        self.commands.recv().await
    }

    pub fn try_next_command(&mut self) -> Option<Command> {
        self.commands.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (Connection, ConnectionDriver) {
        Connection::channel(Namespace::new("lobby-1").unwrap(), "ws://localhost/ws")
    }

    #[tokio::test]
    async fn test_events_reach_subscribers_in_order() {
        // テスト項目: driver が発行したイベントが順番通りに購読者へ届く
        // given (前提条件):
        let (connection, driver) = channel();
        let mut events = connection.subscribe();

        // when (操作):
        driver.emit(ConnectionEvent::Opened);
        driver.emit(ConnectionEvent::Text("hello".to_string()));

        // then (期待する結果):
        assert_eq!(events.recv().await.unwrap(), ConnectionEvent::Opened);
        assert_eq!(
            events.recv().await.unwrap(),
            ConnectionEvent::Text("hello".to_string())
        );
        assert_eq!(connection.last_text(), Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_wait_open_resolves_when_driver_opens() {
        // テスト項目: driver が Open にすると wait_open が成功する
        // given (前提条件):
        let (connection, driver) = channel();

        // when (操作):
        driver.set_state(ConnectionState::Open);
        let result = connection.wait_open().await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(connection.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn test_wait_open_reports_failure() {
        // テスト項目: 接続失敗時に wait_open がエラーを返す
        // given (前提条件):
        let (connection, driver) = channel();

        // when (操作):
        driver.set_state(ConnectionState::Failed);
        let result = connection.wait_open().await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_wait_open_when_driver_dropped() {
        // テスト項目: driver が破棄されると wait_open は Closed エラーを返す
        // given (前提条件):
        let (connection, driver) = channel();

        // when (操作):
        drop(driver);
        let result = connection.wait_open().await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ClientError::ConnectionClosed("lobby-1".to_string()))
        );
    }

    #[test]
    fn test_send_text_is_queued_while_connecting() {
        // テスト項目: 接続中に送信したテキストがコマンドとしてキューされる
        // given (前提条件):
        let (connection, mut driver) = channel();

        // when (操作):
        let result = connection.send_text("bet");

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(
            driver.try_next_command(),
            Some(Command::Text("bet".to_string()))
        );
    }

    #[test]
    fn test_send_text_after_close_is_rejected() {
        // テスト項目: Closed 状態でのテキスト送信はエラーになる
        // given (前提条件):
        let (connection, driver) = channel();
        driver.set_state(ConnectionState::Closed);

        // when (操作):
        let result = connection.send_text("bet");

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ClientError::ConnectionClosed("lobby-1".to_string()))
        );
    }
}
