//! Root node for one configured endpoint.

use std::sync::Arc;

use crate::connection::{ConnectionManager, DataSource};
use crate::error::{Error, Result};
use crate::models::{ConnectionStatus, TreeNodeId};
use crate::tree::context::{ExplorerContext, NodeContext};
use crate::tree::node::{ExpandableNode, Node, TreeNode};
use crate::tree::reconcile::{
    ChildCache, rebuild_children, reconcile_children, sort_case_insensitive, to_tree_nodes,
};
use crate::tree::{
    CollapsibleState, DatabaseNode, DatabaseState, StreamProcessorNode, StreamProcessorState,
    TreeItem,
};

pub const CONNECTED_CONTEXT: &str = "connectedConnectionTreeItem";
pub const DISCONNECTED_CONTEXT: &str = "disconnectedConnectionTreeItem";

#[derive(Clone)]
pub struct ConnectionState {
    id: String,
    instance_id: String,
    manager: Arc<dyn ConnectionManager>,
    explorer: ExplorerContext,
    is_expanded: bool,
    cache_is_up_to_date: bool,
    /// Source the caches were fetched from.
    source: Option<Arc<dyn DataSource>>,
    databases: ChildCache<DatabaseState>,
    stream_processors: ChildCache<StreamProcessorState>,
}

impl ExpandableNode for ConnectionState {
    fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    fn cache_is_up_to_date(&self) -> bool {
        self.cache_is_up_to_date
    }
}

pub type ConnectionNode = Node<ConnectionState>;

enum Listing {
    Databases(ChildCache<DatabaseState>),
    StreamProcessors(ChildCache<StreamProcessorState>),
}

impl ConnectionNode {
    pub fn new(
        id: impl Into<String>,
        is_expanded: bool,
        manager: Arc<dyn ConnectionManager>,
        explorer: ExplorerContext,
    ) -> Self {
        let id = id.into();
        Self::from_state(ConnectionState {
            instance_id: new_instance_id(&id),
            id,
            manager,
            explorer,
            is_expanded,
            cache_is_up_to_date: false,
            source: None,
            databases: ChildCache::new(),
            stream_processors: ChildCache::new(),
        })
    }

    /// Fresh instance for a root pass, with a new host id.
    pub(crate) fn rebuild_for_pass(&self) -> Self {
        let node = self.rebuild();
        {
            let mut state = node.lock();
            state.instance_id = new_instance_id(&state.id);
        }
        node
    }

    pub(crate) fn collapse_if_disconnected(&self) {
        let (id, manager) = {
            let state = self.lock();
            (state.id.clone(), state.manager.clone())
        };
        if manager.connection_status(&id) == ConnectionStatus::Disconnected {
            let mut state = self.lock();
            state.is_expanded = false;
            state.cache_is_up_to_date = false;
        }
    }

    pub fn connection_id(&self) -> String {
        self.lock().id.clone()
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        let status = state.manager.connection_status(&state.id);
        let label = state.manager.connection_name(&state.id).unwrap_or_else(|| state.id.clone());
        let context = if status == ConnectionStatus::Connected {
            CONNECTED_CONTEXT
        } else {
            DISCONNECTED_CONTEXT
        };

        let mut item = TreeItem::new(
            TreeNodeId::connection(state.id.clone()),
            label.clone(),
            CollapsibleState::from_expanded(state.is_expanded),
        )
        .with_id(state.instance_id.clone())
        .with_tooltip(label)
        .with_context(context)
        .with_icon(if status == ConnectionStatus::Connected {
            "connection-active"
        } else {
            "connection-inactive"
        });
        let description = status.description();
        if !description.is_empty() {
            item = item.with_description(description);
        }
        item
    }

    pub async fn children(&self) -> Result<Vec<TreeNode>> {
        let (id, manager, explorer, is_expanded, cache_is_up_to_date) = {
            let state = self.lock();
            (
                state.id.clone(),
                state.manager.clone(),
                state.explorer.clone(),
                state.is_expanded,
                state.cache_is_up_to_date,
            )
        };

        if !is_expanded || manager.is_connecting() || manager.is_disconnecting() {
            return Ok(Vec::new());
        }

        let source = match manager.active_data_source() {
            Some(source) if manager.active_connection_id().as_deref() == Some(id.as_str()) => {
                source
            }
            _ => return Err(Error::NotConnected(format!("connection {id} is not active"))),
        };

        if cache_is_up_to_date {
            let mut state = self.lock();
            state.databases = rebuild_children(&state.databases);
            state.stream_processors = rebuild_children(&state.stream_processors);
            return Ok(state.wrap_children(source.as_ref()));
        }

        let ctx = NodeContext::new(id.clone(), source.clone(), explorer);
        let listing = if source.is_stream_processing_instance() {
            log::debug!("Listing stream processors of {id}");
            let processors = source
                .list_stream_processors()
                .await
                .map_err(|err| Error::fetch("Unable to list stream processors", err))?;
            let previous = self.previous_cache(&source, |state| &state.stream_processors);
            let mut cache = reconcile_children(
                &previous,
                processors,
                |info| info.name.clone(),
                |info, prior| match prior {
                    Some(node) => {
                        node.set_state(info.state);
                        node
                    }
                    None => StreamProcessorNode::new(info, ctx.clone()),
                },
            );
            sort_case_insensitive(&mut cache);
            Listing::StreamProcessors(cache)
        } else {
            log::debug!("Listing databases of {id}");
            let databases = source
                .list_databases()
                .await
                .map_err(|err| Error::fetch("Unable to list databases", err))?;
            let previous = self.previous_cache(&source, |state| &state.databases);
            let mut cache = reconcile_children(
                &previous,
                databases,
                |info| info.name.clone(),
                |info, prior| prior.unwrap_or_else(|| DatabaseNode::new(info.name, ctx.clone())),
            );
            sort_case_insensitive(&mut cache);
            Listing::Databases(cache)
        };

        let mut state = self.lock();
        match listing {
            Listing::Databases(cache) => state.databases = cache,
            Listing::StreamProcessors(cache) => state.stream_processors = cache,
        }
        state.source = Some(source.clone());
        state.cache_is_up_to_date = true;

        if !state.is_expanded {
            return Ok(Vec::new());
        }
        Ok(state.wrap_children(source.as_ref()))
    }

    /// Previous children, or nothing when they were fetched from another client.
    fn previous_cache<S: Clone>(
        &self,
        source: &Arc<dyn DataSource>,
        cache: impl Fn(&ConnectionState) -> &ChildCache<S>,
    ) -> ChildCache<S> {
        let state = self.lock();
        match &state.source {
            Some(previous) if Arc::ptr_eq(previous, source) => cache(&state).clone(),
            _ => ChildCache::new(),
        }
    }

    /// Expand, connecting first when this is not the active endpoint.
    pub async fn on_expand(&self) -> bool {
        let (id, manager, explorer) = {
            let mut state = self.lock();
            state.cache_is_up_to_date = false;
            state.is_expanded = true;
            (state.id.clone(), state.manager.clone(), state.explorer.clone())
        };

        if manager.active_connection_id().as_deref() == Some(id.as_str()) {
            return true;
        }

        match manager.connect_with_connection_id(&id).await {
            Ok(true) => true,
            Ok(false) => {
                self.lock().is_expanded = false;
                false
            }
            Err(err) => {
                self.lock().is_expanded = false;
                explorer.notify_error(err.to_string());
                false
            }
        }
    }

    pub fn on_collapse(&self) {
        let mut state = self.lock();
        state.is_expanded = false;
        state.cache_is_up_to_date = false;
    }

    pub fn reset_cache(&self) {
        let mut state = self.lock();
        state.databases.clear();
        state.stream_processors.clear();
        state.cache_is_up_to_date = false;
    }

    /// Cached database handle by name.
    pub fn database(&self, name: &str) -> Option<DatabaseNode> {
        self.lock().databases.get(name).cloned()
    }

    pub fn stream_processor(&self, name: &str) -> Option<StreamProcessorNode> {
        self.lock().stream_processors.get(name).cloned()
    }
}

impl ConnectionState {
    fn wrap_children(&self, source: &dyn DataSource) -> Vec<TreeNode> {
        if source.is_stream_processing_instance() {
            to_tree_nodes(&self.stream_processors, TreeNode::StreamProcessor)
        } else {
            to_tree_nodes(&self.databases, TreeNode::Database)
        }
    }
}

fn new_instance_id(id: &str) -> String {
    format!("{}-{id}", uuid::Uuid::new_v4().simple())
}
