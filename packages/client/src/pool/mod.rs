//! Reference-counted connection multiplexer.
//!
//! One live connection per namespace, shared by every consumer that acquires
//! it, closed when the last consumer releases it.
//!
//! ## State per namespace
//!
//! ```text
//! ABSENT --acquire--> OPEN(1) --acquire--> OPEN(n)
//! OPEN(n) --release--> OPEN(n-1)      OPEN(1) --release--> ABSENT (closed)
//! ```
//!
//! `acquire` and `release` are the only mutators and run under one lock, so
//! the registry is never observed mid-update.

mod connection;
mod connector;
mod namespace;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub use connection::{Command, Connection, ConnectionDriver, ConnectionEvent, ConnectionState};
pub use connector::{Connector, WebSocketConnector, endpoint_url};
pub use namespace::Namespace;

struct Entry {
    connection: Arc<Connection>,
    ref_count: usize,
}

/// Registry of shared connections keyed by namespace.
///
/// Construct one at the composition root and hand it out behind an `Arc`.
pub struct ConnectionPool {
    connector: Arc<dyn Connector>,
    entries: Mutex<HashMap<Namespace, Entry>>,
}

impl ConnectionPool {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Pool backed by [`WebSocketConnector`].
    pub fn websocket() -> Self {
        Self::new(Arc::new(WebSocketConnector))
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Namespace, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the shared connection for `namespace`, opening it on first use.
    ///
    /// `url` is only used when the namespace has no live connection. A
    /// different URL for an already-open namespace is logged and ignored.
    pub fn acquire(&self, namespace: &Namespace, url: &str) -> Arc<Connection> {
        let mut entries = self.entries();

        if let Some(entry) = entries.get_mut(namespace) {
            entry.ref_count += 1;
            if entry.connection.url() != url {
                tracing::warn!(
                    "Namespace '{}' is already connected to {}; ignoring requested URL {}",
                    namespace,
                    entry.connection.url(),
                    url
                );
            }
            tracing::debug!(
                "Reusing connection for '{}' (ref_count={})",
                namespace,
                entry.ref_count
            );
            return entry.connection.clone();
        }

        let connection = Arc::new(self.connector.open(namespace, url));
        entries.insert(
            namespace.clone(),
            Entry {
                connection: connection.clone(),
                ref_count: 1,
            },
        );
        tracing::info!("Opened connection for '{}' to {}", namespace, url);
        connection
    }

    /// Drop one hold on `namespace`; the last release closes the connection.
    ///
    /// Releasing a namespace with no entry is a no-op.
    pub fn release(&self, namespace: &Namespace) {
        let mut entries = self.entries();

        let Some(entry) = entries.get_mut(namespace) else {
            tracing::debug!("Release of '{}' without a live connection ignored", namespace);
            return;
        };

        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            tracing::debug!(
                "Released '{}' (ref_count={})",
                namespace,
                entry.ref_count
            );
            return;
        }

        if let Some(entry) = entries.remove(namespace) {
            entry.connection.close();
            tracing::info!("Closed connection for '{}'", namespace);
        }
    }

    /// Acquire `namespace` and release it when the returned guard drops.
    pub fn lease(self: &Arc<Self>, namespace: &Namespace, url: &str) -> Lease {
        let connection = self.acquire(namespace, url);
        Lease {
            pool: self.clone(),
            namespace: namespace.clone(),
            connection,
        }
    }

    pub fn ref_count(&self, namespace: &Namespace) -> usize {
        self.entries()
            .get(namespace)
            .map_or(0, |entry| entry.ref_count)
    }

    pub fn contains(&self, namespace: &Namespace) -> bool {
        self.entries().contains_key(namespace)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Live namespaces with their ref counts, sorted by namespace.
    pub fn namespaces(&self) -> Vec<(Namespace, usize)> {
        let mut namespaces: Vec<(Namespace, usize)> = self
            .entries()
            .iter()
            .map(|(namespace, entry)| (namespace.clone(), entry.ref_count))
            .collect();
        namespaces.sort();
        namespaces
    }
}

/// One hold on a pooled connection, released on drop.
pub struct Lease {
    pool: Arc<ConnectionPool>,
    namespace: Namespace,
    connection: Arc<Connection>,
}

impl Lease {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.pool.release(&self.namespace);
    }
}
