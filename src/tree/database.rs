use crate::error::{Error, Result};
use crate::explorer::confirm::drop_with_confirmation;
use crate::models::{Namespace, TreeNodeId};
use crate::tree::context::NodeContext;
use crate::tree::node::{ExpandableNode, Node, TreeNode};
use crate::tree::reconcile::{
    ChildCache, rebuild_children, reconcile_children, sort_collections, to_tree_nodes,
};
use crate::tree::{CollapsibleState, CollectionNode, CollectionState, TreeItem};

#[derive(Clone)]
pub struct DatabaseState {
    name: String,
    ctx: NodeContext,
    is_expanded: bool,
    cache_is_up_to_date: bool,
    is_dropped: bool,
    collections: ChildCache<CollectionState>,
}

impl ExpandableNode for DatabaseState {
    fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    fn cache_is_up_to_date(&self) -> bool {
        self.cache_is_up_to_date
    }

    fn is_dropped(&self) -> bool {
        self.is_dropped
    }
}

/// A database and its keyed, sorted collections.
pub type DatabaseNode = Node<DatabaseState>;

impl DatabaseNode {
    pub fn new(name: impl Into<String>, ctx: NodeContext) -> Self {
        Self::from_state(DatabaseState {
            name: name.into(),
            ctx,
            is_expanded: false,
            cache_is_up_to_date: false,
            is_dropped: false,
            collections: ChildCache::new(),
        })
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        TreeItem::new(
            TreeNodeId::database(state.ctx.connection_id.clone(), state.name.clone()),
            state.name.clone(),
            CollapsibleState::from_expanded(state.is_expanded),
        )
        .with_tooltip(state.name.clone())
        .with_context("databaseTreeItem")
        .with_icon("database")
    }

    pub async fn children(&self) -> Result<Vec<TreeNode>> {
        let (name, ctx, is_expanded, cache_is_up_to_date) = {
            let state = self.lock();
            (state.name.clone(), state.ctx.clone(), state.is_expanded, state.cache_is_up_to_date)
        };

        if !is_expanded {
            return Ok(Vec::new());
        }

        if cache_is_up_to_date {
            let mut state = self.lock();
            state.collections = rebuild_children(&state.collections);
            return Ok(to_tree_nodes(&state.collections, TreeNode::Collection));
        }

        log::debug!("Listing collections of {name}");
        let collections = ctx.source.list_collections(&name).await.map_err(|err| {
            log::error!("Unable to list collections of {name}: {err}");
            Error::fetch("Unable to list collections", err)
        })?;

        let previous = self.lock().collections.clone();
        let mut cache = reconcile_children(
            &previous,
            collections,
            |info| info.name.clone(),
            |info, prior| match prior {
                Some(node) => {
                    node.set_kind(info.kind);
                    node
                }
                None => CollectionNode::new(
                    info.kind,
                    Namespace::new(name.clone(), info.name),
                    ctx.clone(),
                ),
            },
        );
        sort_collections(&mut cache);

        let mut state = self.lock();
        state.collections = cache;
        state.cache_is_up_to_date = true;
        if !state.is_expanded {
            return Ok(Vec::new());
        }
        Ok(to_tree_nodes(&state.collections, TreeNode::Collection))
    }

    pub fn on_expand(&self) -> bool {
        let mut state = self.lock();
        state.cache_is_up_to_date = false;
        state.is_expanded = true;
        true
    }

    pub fn on_collapse(&self) {
        let mut state = self.lock();
        state.is_expanded = false;
        state.cache_is_up_to_date = false;
    }

    pub fn reset_cache(&self) {
        let mut state = self.lock();
        state.collections.clear();
        state.cache_is_up_to_date = false;
    }

    pub fn collection(&self, name: &str) -> Option<CollectionNode> {
        self.lock().collections.get(name).cloned()
    }

    /// Drop the database after the user retypes its name.
    pub async fn on_drop_database_clicked(&self) -> Result<bool> {
        let (name, ctx) = {
            let state = self.lock();
            (state.name.clone(), state.ctx.clone())
        };

        let dropped = drop_with_confirmation(&ctx.explorer, "database", &name, || {
            ctx.source.drop_database(&name)
        })
        .await?;

        if dropped {
            self.lock().is_dropped = true;
        }
        Ok(dropped)
    }
}
