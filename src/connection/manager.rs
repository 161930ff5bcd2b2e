//! Connection lifecycle: which endpoint is active, connecting or disconnecting.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::connection::mongo::MongoDataSource;
use crate::connection::source::DataSource;
use crate::error::{Error, Result};
use crate::models::{ConnectionStatus, SavedConnection};
use crate::state::ConnectionEvent;

const EVENT_CAPACITY: usize = 64;

/// What the tree needs to know about configured endpoints.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    /// Ids of all saved connections.
    fn connection_ids(&self) -> Vec<String>;

    fn connection_name(&self, id: &str) -> Option<String>;

    fn active_connection_id(&self) -> Option<String>;

    fn connecting_connection_id(&self) -> Option<String>;

    fn is_connecting(&self) -> bool;

    fn is_disconnecting(&self) -> bool;

    /// Data source of the active connection.
    fn active_data_source(&self) -> Option<Arc<dyn DataSource>>;

    /// Connect to a saved endpoint. `Ok(false)` means a newer attempt superseded this one.
    async fn connect_with_connection_id(&self, id: &str) -> Result<bool>;

    fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent>;

    /// Lifecycle status of one connection, derived from the queries above.
    fn connection_status(&self, id: &str) -> ConnectionStatus {
        let is_active = self.active_connection_id().as_deref() == Some(id);
        if is_active && self.is_disconnecting() {
            ConnectionStatus::Disconnecting
        } else if is_active {
            ConnectionStatus::Connected
        } else if self.is_connecting() && self.connecting_connection_id().as_deref() == Some(id) {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Disconnected
        }
    }
}

#[derive(Default)]
struct ManagerState {
    connections: Vec<SavedConnection>,
    active: Option<(String, Arc<MongoDataSource>)>,
    connecting: Option<String>,
    disconnecting: bool,
}

/// Connection manager over the MongoDB driver.
pub struct MongoConnectionManager {
    state: RwLock<ManagerState>,
    events: broadcast::Sender<ConnectionEvent>,
    connect_timeout: Duration,
}

impl MongoConnectionManager {
    pub fn new(connections: Vec<SavedConnection>, connect_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(ManagerState { connections, ..Default::default() }),
            events,
            connect_timeout,
        }
    }

    pub fn connections(&self) -> Vec<SavedConnection> {
        self.state.read().connections.clone()
    }

    pub fn add_connection(&self, connection: SavedConnection) -> String {
        let id = connection.connection_id();
        self.state.write().connections.push(connection);
        self.emit(ConnectionEvent::ConnectionsDidChange);
        id
    }

    /// Remove a saved connection, disconnecting first when it is active.
    pub async fn remove_connection(&self, id: &str) -> Result<bool> {
        if self.active_connection_id().as_deref() == Some(id) {
            self.disconnect().await?;
        }

        let removed = {
            let mut state = self.state.write();
            let before = state.connections.len();
            state.connections.retain(|conn| conn.connection_id() != id);
            before != state.connections.len()
        };
        if removed {
            self.emit(ConnectionEvent::ConnectionsDidChange);
        }
        Ok(removed)
    }

    /// Close the active client, if any.
    pub async fn disconnect(&self) -> Result<bool> {
        let active = {
            let mut state = self.state.write();
            if state.active.is_none() {
                return Ok(false);
            }
            state.disconnecting = true;
            state.active.clone()
        };
        self.emit(ConnectionEvent::ConnectionsDidChange);

        if let Some((id, source)) = active {
            source.client().clone().shutdown().await;
            {
                let mut state = self.state.write();
                state.active = None;
                state.disconnecting = false;
            }
            log::info!("Disconnected from {id}");
            self.emit(ConnectionEvent::Disconnected(id));
        }
        self.emit(ConnectionEvent::ConnectionsDidChange);
        Ok(true)
    }

    fn emit(&self, event: ConnectionEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    fn uri_for(&self, id: &str) -> Option<String> {
        self.state
            .read()
            .connections
            .iter()
            .find(|conn| conn.connection_id() == id)
            .map(|conn| conn.uri.clone())
    }
}

#[async_trait]
impl ConnectionManager for MongoConnectionManager {
    fn connection_ids(&self) -> Vec<String> {
        self.state.read().connections.iter().map(SavedConnection::connection_id).collect()
    }

    fn connection_name(&self, id: &str) -> Option<String> {
        self.state
            .read()
            .connections
            .iter()
            .find(|conn| conn.connection_id() == id)
            .map(|conn| conn.name.clone())
    }

    fn active_connection_id(&self) -> Option<String> {
        self.state.read().active.as_ref().map(|(id, _)| id.clone())
    }

    fn connecting_connection_id(&self) -> Option<String> {
        self.state.read().connecting.clone()
    }

    fn is_connecting(&self) -> bool {
        self.state.read().connecting.is_some()
    }

    fn is_disconnecting(&self) -> bool {
        self.state.read().disconnecting
    }

    fn active_data_source(&self) -> Option<Arc<dyn DataSource>> {
        self.state
            .read()
            .active
            .as_ref()
            .map(|(_, source)| source.clone() as Arc<dyn DataSource>)
    }

    async fn connect_with_connection_id(&self, id: &str) -> Result<bool> {
        let uri = self
            .uri_for(id)
            .ok_or_else(|| Error::NotConnected(format!("No saved connection with id {id}")))?;

        if self.active_connection_id().is_some() {
            self.disconnect().await?;
        }

        self.state.write().connecting = Some(id.to_string());
        self.emit(ConnectionEvent::Connecting(id.to_string()));
        self.emit(ConnectionEvent::ConnectionsDidChange);

        let result = MongoDataSource::connect(&uri, self.connect_timeout).await;

        let superseded = {
            let mut state = self.state.write();
            if state.connecting.as_deref() != Some(id) {
                true
            } else {
                state.connecting = None;
                if let Ok(source) = &result {
                    state.active = Some((id.to_string(), Arc::new(source.clone())));
                    if let Some(conn) =
                        state.connections.iter_mut().find(|conn| conn.connection_id() == id)
                    {
                        conn.last_connected = Some(Utc::now());
                    }
                }
                false
            }
        };

        if superseded {
            log::debug!("Connection attempt to {id} was superseded");
            return Ok(false);
        }

        match result {
            Ok(_) => {
                log::info!("Connected to {id}");
                self.emit(ConnectionEvent::Connected(id.to_string()));
                self.emit(ConnectionEvent::ConnectionsDidChange);
                Ok(true)
            }
            Err(err) => {
                log::error!("Unable to connect to {id}: {err}");
                self.emit(ConnectionEvent::ConnectionFailed {
                    id: id.to_string(),
                    error: err.to_string(),
                });
                self.emit(ConnectionEvent::ConnectionsDidChange);
                Err(err)
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }
}
