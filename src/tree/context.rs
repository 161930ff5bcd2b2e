//! Collaborators shared by every node of a session.

use std::sync::Arc;

use crate::connection::DataSource;
use crate::explorer::HostWindow;
use crate::state::{ChangeStreamRegistry, ExplorerSettings, StatusMessage, TreeChangeSignal};

/// Session-wide collaborators.
#[derive(Clone)]
pub struct ExplorerContext {
    pub window: Arc<dyn HostWindow>,
    pub settings: Arc<ExplorerSettings>,
    pub change_streams: ChangeStreamRegistry,
    pub signal: TreeChangeSignal,
}

impl ExplorerContext {
    pub fn new(window: Arc<dyn HostWindow>, settings: ExplorerSettings) -> Self {
        Self {
            window,
            settings: Arc::new(settings),
            change_streams: ChangeStreamRegistry::new(),
            signal: TreeChangeSignal::new(),
        }
    }

    pub fn with_change_streams(mut self, registry: ChangeStreamRegistry) -> Self {
        self.change_streams = registry;
        self
    }

    pub fn page_size(&self) -> usize {
        self.settings.documents_page_size
    }

    pub fn notify_error(&self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{text}");
        self.window.show_message(StatusMessage::error(text));
    }

    pub fn notify_info(&self, text: impl Into<String>) {
        self.window.show_message(StatusMessage::info(text));
    }
}

/// Everything a node below one connection needs.
#[derive(Clone)]
pub struct NodeContext {
    pub connection_id: String,
    pub source: Arc<dyn DataSource>,
    pub explorer: ExplorerContext,
}

impl NodeContext {
    pub fn new(
        connection_id: impl Into<String>,
        source: Arc<dyn DataSource>,
        explorer: ExplorerContext,
    ) -> Self {
        Self { connection_id: connection_id.into(), source, explorer }
    }
}
