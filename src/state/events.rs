//! Events for reactive tree updates

use std::sync::Arc;

use tokio::sync::watch;

/// Events emitted by a connection manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Anything about the set of connections or their states changed.
    ConnectionsDidChange,
    Connecting(String),
    Connected(String),
    Disconnected(String),
    ConnectionFailed { id: String, error: String },
}

/// Generation counter bumped whenever the tree should be re-queried.
#[derive(Debug, Clone)]
pub struct TreeChangeSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl TreeChangeSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn notify(&self) {
        self.tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for TreeChangeSignal {
    fn default() -> Self {
        Self::new()
    }
}
