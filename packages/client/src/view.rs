//! A game screen's hold on a namespace and the round it is showing.
//!
//! Attaching takes a pool lease and starts two scoped tasks: a listener that
//! turns pushed `round-started` events into ticker restarts, and the ticker
//! itself. Dropping the view stops both before the lease is released.

use std::{sync::Arc, time::Duration};

use roundfeed_shared::{round::RoundRecord, time::Clock, wire::RoundEvent};
use tokio::{
    sync::{broadcast, broadcast::error::RecvError, watch},
    task::JoinHandle,
};

use crate::{
    clock::ClockState,
    formatter::StatusFormatter,
    pool::{Connection, ConnectionEvent, ConnectionPool, Lease, Namespace},
    ticker::{RoundTicker, Snapshot},
};

pub struct GameView {
    ticker: Arc<RoundTicker>,
    listener: JoinHandle<()>,
    lease: Lease,
}

impl GameView {
    /// Acquire `namespace` from the pool and start following its rounds.
    ///
    /// If the shared connection already carries a round (another view opened
    /// it earlier), that round is picked up immediately.
    pub fn attach(
        pool: &Arc<ConnectionPool>,
        namespace: &Namespace,
        url: &str,
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> Self {
        let lease = pool.lease(namespace, url);
        let ticker = Arc::new(RoundTicker::new(clock, period));

        // Subscribe before reading the retained frame so nothing falls between
        let events = lease.connection().subscribe();
        if let Some(text) = lease.connection().last_text() {
            apply_text(&ticker, namespace, &text);
        }
        let listener = tokio::spawn(listen(namespace.clone(), events, ticker.clone()));

        Self {
            ticker,
            listener,
            lease,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        self.lease.namespace()
    }

    pub fn connection(&self) -> &Arc<Connection> {
        self.lease.connection()
    }

    pub fn state(&self) -> Option<ClockState> {
        self.ticker.current_state()
    }

    pub fn round(&self) -> Option<RoundRecord> {
        self.ticker.current_round()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot>> {
        self.ticker.subscribe()
    }

    pub fn render(&self) -> String {
        StatusFormatter::format_status(self.namespace(), self.ticker.snapshot().as_ref())
    }
}

impl Drop for GameView {
    fn drop(&mut self) {
        self.listener.abort();
        self.ticker.stop();
        // `lease` drops after this and releases the namespace
    }
}

async fn listen(
    namespace: Namespace,
    mut events: broadcast::Receiver<ConnectionEvent>,
    ticker: Arc<RoundTicker>,
) {
    loop {
        match events.recv().await {
            Ok(ConnectionEvent::Text(text)) => {
                apply_text(&ticker, &namespace, &text);
            }
            Ok(ConnectionEvent::Error(e)) => {
                tracing::warn!("Connection error on '{}': {}", namespace, e);
            }
            Ok(ConnectionEvent::Closed) | Err(RecvError::Closed) => {
                tracing::info!("Connection for '{}' closed", namespace);
                break;
            }
            Ok(ConnectionEvent::Opened) | Ok(ConnectionEvent::Binary(_)) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Skipped {} events on '{}'", skipped, namespace);
            }
        }
    }
}

/// Apply one text frame; returns `true` when a new round was started.
fn apply_text(ticker: &RoundTicker, namespace: &Namespace, text: &str) -> bool {
    let event = match RoundEvent::from_json(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!("Ignoring frame on '{}': {}", namespace, e);
            return false;
        }
    };

    match event {
        RoundEvent::RoundStarted { round } => {
            let round_id = round.id.clone();
            let malformed = round.validate().err();
            // attach and the listener may both deliver the same round
            if !ticker.watch_new_round(round) {
                return false;
            }
            if let Some(e) = malformed {
                tracing::warn!("Round {} on '{}' is malformed: {}", round_id, namespace, e);
            }
            tracing::info!("Round {} started on '{}'", round_id, namespace);
            true
        }
        RoundEvent::RoundEnded { round_id } => {
            tracing::debug!("Round {} ended on '{}'", round_id, namespace);
            false
        }
    }
}
