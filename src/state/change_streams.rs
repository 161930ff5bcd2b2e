//! Per-session registry of live change stream listeners.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::connection::DataSource;
use crate::models::{ChangeEvent, Namespace};
use crate::state::events::TreeChangeSignal;

/// Events kept per listener; older ones are discarded.
pub const MAX_BUFFERED_EVENTS: usize = 100;

type EventBuffer = Arc<Mutex<Vec<ChangeEvent>>>;

struct Listener {
    events: EventBuffer,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct RegistryInner {
    listeners: Mutex<HashMap<String, Listener>>,
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        for (_, listener) in self.listeners.get_mut().drain() {
            listener.task.abort();
        }
    }
}

/// Listeners keyed by `{connection}:{namespace}`, owned by one explorer session.
///
/// Clones share the same listeners. When the last clone is dropped every
/// listener task is aborted.
#[derive(Clone, Default)]
pub struct ChangeStreamRegistry {
    inner: Arc<RegistryInner>,
}

impl ChangeStreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(connection_id: &str, namespace: &Namespace) -> String {
        format!("{connection_id}:{namespace}")
    }

    pub fn is_listening(&self, key: &str) -> bool {
        self.inner.listeners.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start watching `namespace` unless a listener for `key` already exists.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen(
        &self,
        key: &str,
        source: Arc<dyn DataSource>,
        namespace: Namespace,
        signal: TreeChangeSignal,
    ) {
        let mut listeners = self.inner.listeners.lock();
        if listeners.contains_key(key) {
            return;
        }

        let events: EventBuffer = Arc::default();
        let buffer = events.clone();
        let task = tokio::spawn(async move {
            let mut stream = match source.watch(&namespace).await {
                Ok(stream) => stream,
                Err(err) => {
                    log::error!("Unable to watch {namespace}: {err}");
                    return;
                }
            };
            log::debug!("Listening for changes on {namespace}");

            while let Some(event) = stream.next().await {
                match event {
                    Ok(event) => {
                        {
                            let mut buffer = buffer.lock();
                            buffer.push(event);
                            if buffer.len() > MAX_BUFFERED_EVENTS {
                                let excess = buffer.len() - MAX_BUFFERED_EVENTS;
                                buffer.drain(..excess);
                            }
                        }
                        signal.notify();
                    }
                    Err(err) => {
                        log::error!("Change stream on {namespace} failed: {err}");
                        break;
                    }
                }
            }
        });

        listeners.insert(key.to_string(), Listener { events, task });
    }

    /// Received events, newest first.
    pub fn events(&self, key: &str) -> Vec<ChangeEvent> {
        self.inner
            .listeners
            .lock()
            .get(key)
            .map(|listener| listener.events.lock().iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub fn stop(&self, key: &str) -> bool {
        match self.inner.listeners.lock().remove(key) {
            Some(listener) => {
                listener.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn close_all(&self) {
        let drained: Vec<Listener> =
            self.inner.listeners.lock().drain().map(|(_, listener)| listener).collect();
        for listener in drained {
            listener.task.abort();
        }
    }
}

impl std::fmt::Debug for ChangeStreamRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeStreamRegistry").field("listeners", &self.len()).finish()
    }
}
