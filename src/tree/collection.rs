use std::sync::Arc;

use futures::FutureExt;

use crate::error::Result;
use crate::explorer::confirm::drop_with_confirmation;
use crate::models::{CollectionKind, Namespace, TreeNodeId};
use crate::tree::context::NodeContext;
use crate::tree::documents::RefreshCount;
use crate::tree::node::{ExpandableNode, Node, TreeNode};
use crate::tree::{
    ChangeStreamNode, CollapsibleState, DocumentListNode, IndexListNode, SchemaNode, TreeItem,
};

#[derive(Clone)]
pub struct CollectionState {
    kind: CollectionKind,
    namespace: Namespace,
    ctx: NodeContext,
    is_expanded: bool,
    cache_is_up_to_date: bool,
    is_dropped: bool,
    /// `None` until fetched; distinct from zero.
    document_count: Option<u64>,
    documents: DocumentListNode,
    schema: SchemaNode,
    indexes: IndexListNode,
    change_stream: Option<ChangeStreamNode>,
}

impl ExpandableNode for CollectionState {
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

/// A collection with its fixed documents/schema/indexes children.
pub type CollectionNode = Node<CollectionState>;

impl CollectionNode {
    pub fn new(kind: CollectionKind, namespace: Namespace, ctx: NodeContext) -> Self {
        let (documents, schema, indexes) = default_children(kind, &namespace, &ctx);
        Self::from_state(CollectionState {
            kind,
            namespace,
            ctx,
            is_expanded: false,
            cache_is_up_to_date: false,
            is_dropped: false,
            document_count: None,
            documents,
            schema,
            indexes,
            change_stream: None,
        })
    }

    pub fn name(&self) -> String {
        self.lock().namespace.collection.clone()
    }

    pub fn namespace(&self) -> Namespace {
        self.lock().namespace.clone()
    }

    pub fn kind(&self) -> CollectionKind {
        self.lock().kind
    }

    pub fn document_count(&self) -> Option<u64> {
        self.lock().document_count
    }

    pub fn documents(&self) -> DocumentListNode {
        self.lock().documents.clone()
    }

    pub fn schema(&self) -> SchemaNode {
        self.lock().schema.clone()
    }

    pub fn indexes(&self) -> IndexListNode {
        self.lock().indexes.clone()
    }

    pub(crate) fn set_kind(&self, kind: CollectionKind) {
        let documents = {
            let mut state = self.lock();
            state.kind = kind;
            state.documents.clone()
        };
        documents.set_kind(kind);
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        let name = state.namespace.collection.clone();
        let tooltip = if state.kind == CollectionKind::View {
            "Read only view".to_string()
        } else {
            name.clone()
        };
        TreeItem::new(
            TreeNodeId::collection(state.ctx.connection_id.clone(), state.namespace.clone()),
            name,
            CollapsibleState::from_expanded(state.is_expanded),
        )
        .with_tooltip(tooltip)
        .with_context("collectionTreeItem")
        .with_icon(match state.kind {
            CollectionKind::Collection => "collection",
            CollectionKind::View => "view",
            CollectionKind::Timeseries => "timeseries",
        })
    }

    /// Rebuild the fixed children so each carries its own state into a fresh instance.
    pub async fn children(&self) -> Result<Vec<TreeNode>> {
        if !self.is_expanded() {
            return Ok(Vec::new());
        }

        let refresh = self.refresh_callback();
        let mut state = self.lock();

        let documents = state.documents.rebuild();
        documents.attach_parent(refresh, state.document_count);
        state.documents = documents;
        state.schema = state.schema.rebuild();
        state.indexes = state.indexes.rebuild();
        state.change_stream = if state.ctx.explorer.settings.show_change_streams {
            Some(match &state.change_stream {
                Some(existing) => existing.rebuild(),
                None => ChangeStreamNode::new(state.namespace.clone(), state.ctx.clone()),
            })
        } else {
            None
        };
        state.cache_is_up_to_date = true;

        let mut children = vec![
            TreeNode::Documents(state.documents.clone()),
            TreeNode::Schema(state.schema.clone()),
            TreeNode::Indexes(state.indexes.clone()),
        ];
        if let Some(change_stream) = &state.change_stream {
            children.push(TreeNode::ChangeStream(change_stream.clone()));
        }
        Ok(children)
    }

    fn refresh_callback(&self) -> RefreshCount {
        let weak = self.downgrade();
        Arc::new(move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(collection) => collection.refresh_document_count().await,
                    None => None,
                }
            }
            .boxed()
        })
    }

    /// Fetch the estimated document count. Views have none.
    pub async fn refresh_document_count(&self) -> Option<u64> {
        let (kind, namespace, ctx) = {
            let state = self.lock();
            (state.kind, state.namespace.clone(), state.ctx.clone())
        };

        if kind == CollectionKind::View {
            return None;
        }

        match ctx.source.estimated_count(&namespace).await {
            Ok(count) => {
                self.lock().document_count = Some(count);
                Some(count)
            }
            Err(err) => {
                log::warn!("Unable to fetch document count of {namespace}: {err}");
                ctx.explorer.notify_info(format!("Unable to fetch document count: {err}"));
                Some(0)
            }
        }
    }

    pub async fn on_expand(&self) -> bool {
        {
            let mut state = self.lock();
            state.cache_is_up_to_date = false;
            state.is_expanded = true;
        }
        self.refresh_document_count().await;
        true
    }

    pub fn on_collapse(&self) {
        let mut state = self.lock();
        state.is_expanded = false;
        state.cache_is_up_to_date = false;
    }

    /// Reset all children to their defaults and refresh the count.
    pub async fn reset_cache(&self) {
        {
            let mut state = self.lock();
            let (documents, schema, indexes) =
                default_children(state.kind, &state.namespace, &state.ctx);
            state.documents = documents;
            state.schema = schema;
            state.indexes = indexes;
            state.change_stream = None;
            state.cache_is_up_to_date = false;
        }
        self.refresh_document_count().await;
    }

    /// Drop the collection after the user retypes its name.
    pub async fn on_drop_collection_clicked(&self) -> Result<bool> {
        let (namespace, ctx) = {
            let state = self.lock();
            (state.namespace.clone(), state.ctx.clone())
        };

        let dropped =
            drop_with_confirmation(&ctx.explorer, "collection", &namespace.collection, || {
                ctx.source.drop_collection(&namespace)
            })
            .await?;

        if dropped {
            self.lock().is_dropped = true;
        }
        Ok(dropped)
    }
}

fn default_children(
    kind: CollectionKind,
    namespace: &Namespace,
    ctx: &NodeContext,
) -> (DocumentListNode, SchemaNode, IndexListNode) {
    (
        DocumentListNode::new(kind, namespace.clone(), ctx.clone()),
        SchemaNode::new(namespace.clone(), ctx.clone()),
        IndexListNode::new(namespace.clone(), ctx.clone()),
    )
}
