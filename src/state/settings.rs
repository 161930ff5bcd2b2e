//! Explorer settings with persistence.

use serde::{Deserialize, Serialize};

/// Tunables for the explorer tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerSettings {
    /// Document window increment; also the schema sample size.
    #[serde(default = "default_documents_page_size")]
    pub documents_page_size: usize,
    #[serde(default = "default_schema_fields_to_show")]
    pub schema_fields_to_show: usize,
    /// Adds a live "Change Stream" child below every collection.
    #[serde(default)]
    pub show_change_streams: bool,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            documents_page_size: default_documents_page_size(),
            schema_fields_to_show: default_schema_fields_to_show(),
            show_change_streams: false,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ExplorerSettings {
    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_documents_page_size() -> usize {
    10
}

fn default_schema_fields_to_show() -> usize {
    15
}

fn default_connect_timeout_secs() -> u64 {
    10
}
