use crate::error::Result;
use crate::explorer::confirm::drop_with_confirmation;
use crate::models::{IndexDefinition, IndexKeyType, Namespace, TreeNodeId};
use crate::tree::context::NodeContext;
use crate::tree::node::{ExpandableNode, Node, TreeNode};
use crate::tree::reconcile::{
    ChildCache, rebuild_children, reconcile_children, sort_case_insensitive, to_tree_nodes,
};
use crate::tree::{CollapsibleState, TreeItem};

#[derive(Clone)]
pub struct IndexListState {
    namespace: Namespace,
    ctx: NodeContext,
    is_expanded: bool,
    cache_is_up_to_date: bool,
    indexes: ChildCache<IndexState>,
}

impl ExpandableNode for IndexListState {
    fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    fn cache_is_up_to_date(&self) -> bool {
        self.cache_is_up_to_date
    }
}

pub type IndexListNode = Node<IndexListState>;

impl IndexListNode {
    pub fn new(namespace: Namespace, ctx: NodeContext) -> Self {
        Self::from_state(IndexListState {
            namespace,
            ctx,
            is_expanded: false,
            cache_is_up_to_date: false,
            indexes: ChildCache::new(),
        })
    }

    pub fn index(&self, name: &str) -> Option<IndexNode> {
        self.lock().indexes.get(name).cloned()
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        TreeItem::new(
            TreeNodeId::Indexes {
                connection: state.ctx.connection_id.clone(),
                namespace: state.namespace.clone(),
            },
            "Indexes",
            CollapsibleState::from_expanded(state.is_expanded),
        )
        .with_context("indexListTreeItem")
        .with_icon("indexes")
    }

    /// A failed fetch is reported once; the empty result stays cached until the next expand.
    pub async fn children(&self) -> Result<Vec<TreeNode>> {
        let (namespace, ctx, is_expanded, cache_is_up_to_date) = {
            let state = self.lock();
            (
                state.namespace.clone(),
                state.ctx.clone(),
                state.is_expanded,
                state.cache_is_up_to_date,
            )
        };

        if !is_expanded {
            return Ok(Vec::new());
        }

        if cache_is_up_to_date {
            let mut state = self.lock();
            state.indexes = rebuild_children(&state.indexes);
            return Ok(to_tree_nodes(&state.indexes, TreeNode::Index));
        }

        let result = ctx.source.indexes(&namespace).await;

        let mut state = self.lock();
        state.cache_is_up_to_date = true;
        let indexes = match result {
            Ok(indexes) => indexes,
            Err(err) => {
                state.indexes.clear();
                drop(state);
                ctx.explorer.notify_error(format!("Fetch indexes failed: {err}"));
                return Ok(Vec::new());
            }
        };

        state.indexes = reconcile_children(
            &state.indexes,
            indexes,
            |index| index.name.clone(),
            |index, prior| match prior {
                Some(node) => {
                    node.lock().index = index;
                    node
                }
                None => IndexNode::new(index, namespace.clone(), ctx.clone()),
            },
        );
        sort_case_insensitive(&mut state.indexes);

        if !state.is_expanded {
            return Ok(Vec::new());
        }
        Ok(to_tree_nodes(&state.indexes, TreeNode::Index))
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
        state.indexes.clear();
        state.cache_is_up_to_date = false;
    }
}

#[derive(Clone)]
pub struct IndexState {
    index: IndexDefinition,
    namespace: Namespace,
    ctx: NodeContext,
    is_expanded: bool,
    is_dropped: bool,
}

impl ExpandableNode for IndexState {
    fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    fn cache_is_up_to_date(&self) -> bool {
        true
    }

    fn is_dropped(&self) -> bool {
        self.is_dropped
    }
}

/// One index definition; its keys are leaves.
pub type IndexNode = Node<IndexState>;

impl IndexNode {
    pub fn new(index: IndexDefinition, namespace: Namespace, ctx: NodeContext) -> Self {
        Self::from_state(IndexState {
            index,
            namespace,
            ctx,
            is_expanded: false,
            is_dropped: false,
        })
    }

    pub fn definition(&self) -> IndexDefinition {
        self.lock().index.clone()
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        TreeItem::new(
            TreeNodeId::Index {
                connection: state.ctx.connection_id.clone(),
                namespace: state.namespace.clone(),
                name: state.index.name.clone(),
            },
            state.index.name.clone(),
            CollapsibleState::from_expanded(state.is_expanded),
        )
        .with_context("indexTreeItem")
        .with_icon("index")
    }

    /// One leaf per key, in declaration order, regardless of expansion.
    pub fn children(&self) -> Vec<TreeNode> {
        let state = self.lock();
        state
            .index
            .keys()
            .into_iter()
            .map(|(field, kind)| {
                TreeNode::IndexField(IndexFieldNode::new(
                    TreeNodeId::IndexField {
                        connection: state.ctx.connection_id.clone(),
                        namespace: state.namespace.clone(),
                        index: state.index.name.clone(),
                        key: field.clone(),
                    },
                    field,
                    kind,
                ))
            })
            .collect()
    }

    pub fn on_expand(&self) -> bool {
        self.lock().is_expanded = true;
        true
    }

    pub fn on_collapse(&self) {
        self.lock().is_expanded = false;
    }

    /// Drop the index after the user retypes its name.
    pub async fn on_drop_index_clicked(&self) -> Result<bool> {
        let (name, namespace, ctx) = {
            let state = self.lock();
            (state.index.name.clone(), state.namespace.clone(), state.ctx.clone())
        };

        let dropped = drop_with_confirmation(&ctx.explorer, "index", &name, || {
            ctx.source.drop_index(&namespace, &name)
        })
        .await?;

        if dropped {
            self.lock().is_dropped = true;
        }
        Ok(dropped)
    }
}

#[derive(Clone)]
pub struct IndexFieldState {
    key: TreeNodeId,
    field: String,
    kind: IndexKeyType,
}

pub type IndexFieldNode = Node<IndexFieldState>;

impl IndexFieldNode {
    pub fn new(key: TreeNodeId, field: String, kind: IndexKeyType) -> Self {
        Self::from_state(IndexFieldState { key, field, kind })
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        let mut item = TreeItem::new(state.key.clone(), state.field.clone(), CollapsibleState::None)
            .with_context("indexFieldTreeItem")
            .with_icon(match state.kind {
                IndexKeyType::Ascending => "ascending",
                IndexKeyType::Descending => "descending",
                IndexKeyType::Text => "text",
                IndexKeyType::Hashed => "hashed",
                IndexKeyType::Geo | IndexKeyType::Geosphere | IndexKeyType::GeoHaystack => {
                    "geospatial"
                }
                IndexKeyType::Other(_) => "key",
            });
        let description = state.kind.display_name();
        if !description.is_empty() {
            item = item.with_description(description);
        }
        item
    }
}
