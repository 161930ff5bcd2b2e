// Connection configuration models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved connection configuration (persisted to disk)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedConnection {
    pub id: Uuid,
    pub name: String,
    pub uri: String,
    pub last_connected: Option<DateTime<Utc>>,
}

impl SavedConnection {
    pub fn new(name: String, uri: String) -> Self {
        Self { id: Uuid::new_v4(), name, uri, last_connected: None }
    }

    /// Identifier used by the connection manager and the tree.
    pub fn connection_id(&self) -> String {
        self.id.to_string()
    }
}

/// Lifecycle of one configured endpoint as seen by the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionStatus {
    /// Description rendered next to the connection label.
    pub fn description(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "",
            ConnectionStatus::Connecting => "connecting...",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnecting => "disconnecting...",
        }
    }
}
