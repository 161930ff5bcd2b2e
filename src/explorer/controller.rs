//! Entry point the host calls for roots, children and tree events.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::connection::ConnectionManager;
use crate::error::{Error, Result};
use crate::explorer::host::HostWindow;
use crate::models::TreeNodeId;
use crate::state::{ChangeStreamRegistry, ConnectionEvent, ExplorerSettings};
use crate::tree::reconcile::ChildCache;
use crate::tree::{
    ConnectionNode, ConnectionState, ExplorerContext, MessageNode, TreeItem, TreeNode,
};

/// Owns the connection nodes of one explorer session.
pub struct ExplorerTreeController {
    manager: Arc<dyn ConnectionManager>,
    explorer: ExplorerContext,
    connections: Mutex<ChildCache<ConnectionState>>,
}

impl ExplorerTreeController {
    pub fn new(
        manager: Arc<dyn ConnectionManager>,
        window: Arc<dyn HostWindow>,
        settings: ExplorerSettings,
    ) -> Self {
        Self::with_context(manager, ExplorerContext::new(window, settings))
    }

    /// Use an explicit context, e.g. to share a change stream registry.
    pub fn with_context(manager: Arc<dyn ConnectionManager>, explorer: ExplorerContext) -> Self {
        Self { manager, explorer, connections: Mutex::new(ChildCache::new()) }
    }

    pub fn context(&self) -> &ExplorerContext {
        &self.explorer
    }

    pub fn change_streams(&self) -> &ChangeStreamRegistry {
        &self.explorer.change_streams
    }

    /// Generation counter bumped whenever the host should re-query the tree.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.explorer.signal.subscribe()
    }

    pub fn refresh(&self) -> bool {
        self.explorer.signal.notify();
        true
    }

    pub fn on_tree_item_update(&self) {
        self.explorer.signal.notify();
    }

    pub fn get_tree_item(&self, node: &TreeNode) -> TreeItem {
        node.tree_item()
    }

    /// Roots when `node` is `None`, otherwise the node's children.
    pub async fn get_children(&self, node: Option<&TreeNode>) -> Result<Vec<TreeNode>> {
        match node {
            None => Ok(self.root_nodes()),
            Some(node) => node.children().await,
        }
    }

    /// Connection nodes sorted by name, plus a placeholder for an unsaved connecting endpoint.
    fn root_nodes(&self) -> Vec<TreeNode> {
        let ids = self.manager.connection_ids();
        let active = self.manager.active_connection_id();
        let mut connections = self.connections.lock();

        let mut next: ChildCache<ConnectionState> = ids
            .iter()
            .map(|id| {
                let node = match connections.get(id) {
                    Some(existing) => existing.rebuild_for_pass(),
                    None => ConnectionNode::new(
                        id.clone(),
                        active.as_deref() == Some(id.as_str()),
                        self.manager.clone(),
                        self.explorer.clone(),
                    ),
                };
                (id.clone(), node)
            })
            .collect();
        for node in next.values() {
            node.collapse_if_disconnected();
        }

        let manager = &self.manager;
        next.sort_by(|a, _, b, _| {
            let name_a = manager.connection_name(a).unwrap_or_else(|| a.clone());
            let name_b = manager.connection_name(b).unwrap_or_else(|| b.clone());
            name_a.to_lowercase().cmp(&name_b.to_lowercase())
        });
        *connections = next;

        let mut roots: Vec<TreeNode> =
            connections.values().cloned().map(TreeNode::Connection).collect();

        if let Some(connecting) = self.manager.connecting_connection_id() {
            if self.manager.is_connecting() && !ids.contains(&connecting) {
                roots.push(TreeNode::Message(MessageNode::new(
                    TreeNodeId::Transient(format!("connecting-{connecting}")),
                    "connecting...",
                )));
            }
        }
        roots
    }

    /// Cached connection node by id.
    pub fn connection(&self, id: &str) -> Option<ConnectionNode> {
        self.connections.lock().get(id).cloned()
    }

    pub async fn on_expand(&self, node: &TreeNode) -> bool {
        log::info!("Tree item was expanded: {}", node.label());
        let expanded = node.on_expand().await;
        self.on_tree_item_update();
        expanded
    }

    pub fn on_collapse(&self, node: &TreeNode) {
        log::info!("Tree item was collapsed: {}", node.label());
        node.on_collapse();
        self.on_tree_item_update();
    }

    /// Selecting a single "show more" sentinel grows its list.
    pub fn on_selection_changed(&self, selection: &[TreeNode]) -> bool {
        match selection {
            [TreeNode::ShowMore(sentinel)] => {
                sentinel.on_show_more_clicked();
                self.on_tree_item_update();
                true
            }
            _ => false,
        }
    }

    pub async fn reset_cache(&self, node: &TreeNode) {
        node.reset_cache().await;
        self.on_tree_item_update();
    }

    /// Drop the remote object behind `node` after typed confirmation.
    pub async fn drop_node(&self, node: &TreeNode) -> Result<bool> {
        let dropped = match node {
            TreeNode::Database(database) => database.on_drop_database_clicked().await?,
            TreeNode::Collection(collection) => collection.on_drop_collection_clicked().await?,
            TreeNode::Index(index) => index.on_drop_index_clicked().await?,
            TreeNode::StreamProcessor(processor) => processor.on_drop_clicked().await?,
            other => {
                return Err(Error::Unsupported(format!("cannot drop '{}'", other.label())));
            }
        };
        if dropped {
            self.refresh();
        }
        Ok(dropped)
    }

    /// Refresh whenever the connection manager reports a change.
    ///
    /// The task holds a weak reference and ends with the controller or the manager.
    pub fn listen_for_connection_changes(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.manager.subscribe();
        let controller = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let event = events.recv().await;
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                match event {
                    Ok(ConnectionEvent::ConnectionsDidChange) => {
                        controller.refresh();
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("Missed {skipped} connection events");
                        controller.refresh();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// End the session's live listeners.
    pub fn close(&self) {
        self.explorer.change_streams.close_all();
    }
}
