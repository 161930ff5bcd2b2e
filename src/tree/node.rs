//! Node handles and the closed set of node kinds.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::models::TreeNodeId;
use crate::tree::{
    ChangeStreamNode, CollectionNode, ConnectionNode, DatabaseNode, DocumentListNode,
    DocumentNode, FieldNode, IndexFieldNode, IndexListNode, IndexNode, MessageNode, SchemaNode,
    ShowMoreNode, StreamProcessorNode, TreeItem,
};

/// State every expandable node exposes to its parent's reconciliation.
pub trait ExpandableNode {
    fn is_expanded(&self) -> bool;

    fn cache_is_up_to_date(&self) -> bool;

    /// Set after a successful destructive operation; the parent skips it next pass.
    fn is_dropped(&self) -> bool {
        false
    }
}

/// Shared handle to one node instance.
///
/// Cloning the handle shares the instance. `rebuild` allocates a new instance
/// carrying the same state, which is what every reconciliation pass hands out.
pub struct Node<S> {
    state: Arc<Mutex<S>>,
}

impl<S> Clone for Node<S> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone() }
    }
}

impl<S> Node<S> {
    pub(crate) fn from_state(state: S) -> Self {
        Self { state: Arc::new(Mutex::new(state)) }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, S> {
        self.state.lock()
    }

    pub(crate) fn downgrade(&self) -> WeakNode<S> {
        WeakNode { state: Arc::downgrade(&self.state) }
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl<S: Clone> Node<S> {
    /// Fresh instance with a copy of this node's state.
    pub fn rebuild(&self) -> Self {
        let state = self.state.lock().clone();
        Self::from_state(state)
    }
}

impl<S: ExpandableNode> Node<S> {
    pub fn is_expanded(&self) -> bool {
        self.state.lock().is_expanded()
    }

    pub fn cache_is_up_to_date(&self) -> bool {
        self.state.lock().cache_is_up_to_date()
    }

    pub fn is_dropped(&self) -> bool {
        self.state.lock().is_dropped()
    }
}

pub(crate) struct WeakNode<S> {
    state: Weak<Mutex<S>>,
}

impl<S> Clone for WeakNode<S> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone() }
    }
}

impl<S> WeakNode<S> {
    pub(crate) fn upgrade(&self) -> Option<Node<S>> {
        self.state.upgrade().map(|state| Node { state })
    }
}

/// Every kind of node the explorer renders.
#[derive(Clone)]
pub enum TreeNode {
    Connection(ConnectionNode),
    Database(DatabaseNode),
    Collection(CollectionNode),
    Documents(DocumentListNode),
    Document(DocumentNode),
    Schema(SchemaNode),
    Field(FieldNode),
    Indexes(IndexListNode),
    Index(IndexNode),
    IndexField(IndexFieldNode),
    ChangeStream(ChangeStreamNode),
    StreamProcessor(StreamProcessorNode),
    ShowMore(ShowMoreNode),
    Message(MessageNode),
}

impl TreeNode {
    pub fn tree_item(&self) -> TreeItem {
        match self {
            TreeNode::Connection(node) => node.tree_item(),
            TreeNode::Database(node) => node.tree_item(),
            TreeNode::Collection(node) => node.tree_item(),
            TreeNode::Documents(node) => node.tree_item(),
            TreeNode::Document(node) => node.tree_item(),
            TreeNode::Schema(node) => node.tree_item(),
            TreeNode::Field(node) => node.tree_item(),
            TreeNode::Indexes(node) => node.tree_item(),
            TreeNode::Index(node) => node.tree_item(),
            TreeNode::IndexField(node) => node.tree_item(),
            TreeNode::ChangeStream(node) => node.tree_item(),
            TreeNode::StreamProcessor(node) => node.tree_item(),
            TreeNode::ShowMore(node) => node.tree_item(),
            TreeNode::Message(node) => node.tree_item(),
        }
    }

    pub fn key(&self) -> TreeNodeId {
        self.tree_item().key
    }

    pub fn label(&self) -> String {
        self.tree_item().label
    }

    /// Children for the current pass. Leaves have none.
    pub async fn children(&self) -> Result<Vec<TreeNode>> {
        match self {
            TreeNode::Connection(node) => node.children().await,
            TreeNode::Database(node) => node.children().await,
            TreeNode::Collection(node) => node.children().await,
            TreeNode::Documents(node) => node.children().await,
            TreeNode::Schema(node) => node.children().await,
            TreeNode::Field(node) => Ok(node.children()),
            TreeNode::Indexes(node) => node.children().await,
            TreeNode::Index(node) => Ok(node.children()),
            TreeNode::ChangeStream(node) => Ok(node.children()),
            TreeNode::StreamProcessor(node) => Ok(node.children()),
            TreeNode::Document(_)
            | TreeNode::IndexField(_)
            | TreeNode::ShowMore(_)
            | TreeNode::Message(_) => Ok(Vec::new()),
        }
    }

    /// Handle the host expanding this node. Returns whether it ended up expanded.
    pub async fn on_expand(&self) -> bool {
        match self {
            TreeNode::Connection(node) => node.on_expand().await,
            TreeNode::Database(node) => node.on_expand(),
            TreeNode::Collection(node) => node.on_expand().await,
            TreeNode::Documents(node) => node.on_expand().await,
            TreeNode::Schema(node) => node.on_expand(),
            TreeNode::Field(node) => node.on_expand(),
            TreeNode::Indexes(node) => node.on_expand(),
            TreeNode::Index(node) => node.on_expand(),
            TreeNode::ChangeStream(node) => node.on_expand(),
            TreeNode::StreamProcessor(node) => node.on_expand(),
            TreeNode::Document(_)
            | TreeNode::IndexField(_)
            | TreeNode::ShowMore(_)
            | TreeNode::Message(_) => false,
        }
    }

    pub fn on_collapse(&self) {
        match self {
            TreeNode::Connection(node) => node.on_collapse(),
            TreeNode::Database(node) => node.on_collapse(),
            TreeNode::Collection(node) => node.on_collapse(),
            TreeNode::Documents(node) => node.on_collapse(),
            TreeNode::Schema(node) => node.on_collapse(),
            TreeNode::Field(node) => node.on_collapse(),
            TreeNode::Indexes(node) => node.on_collapse(),
            TreeNode::Index(node) => node.on_collapse(),
            TreeNode::ChangeStream(node) => node.on_collapse(),
            TreeNode::StreamProcessor(node) => node.on_collapse(),
            TreeNode::Document(_)
            | TreeNode::IndexField(_)
            | TreeNode::ShowMore(_)
            | TreeNode::Message(_) => {}
        }
    }

    /// Drop cached children so the next pass refetches.
    pub async fn reset_cache(&self) {
        match self {
            TreeNode::Connection(node) => node.reset_cache(),
            TreeNode::Database(node) => node.reset_cache(),
            TreeNode::Collection(node) => node.reset_cache().await,
            TreeNode::Documents(node) => node.reset_cache().await,
            TreeNode::Schema(node) => node.reset_cache(),
            TreeNode::Indexes(node) => node.reset_cache(),
            _ => {}
        }
    }

    pub fn is_expanded(&self) -> bool {
        match self {
            TreeNode::Connection(node) => node.is_expanded(),
            TreeNode::Database(node) => node.is_expanded(),
            TreeNode::Collection(node) => node.is_expanded(),
            TreeNode::Documents(node) => node.is_expanded(),
            TreeNode::Schema(node) => node.is_expanded(),
            TreeNode::Field(node) => node.is_expanded(),
            TreeNode::Indexes(node) => node.is_expanded(),
            TreeNode::Index(node) => node.is_expanded(),
            TreeNode::ChangeStream(node) => node.is_expanded(),
            TreeNode::StreamProcessor(node) => node.is_expanded(),
            _ => false,
        }
    }

    pub fn is_show_more(&self) -> bool {
        matches!(self, TreeNode::ShowMore(_))
    }

    /// Allocation identity. Distinct passes never return the same instance.
    pub fn is_same_instance(&self, other: &TreeNode) -> bool {
        match (self, other) {
            (TreeNode::Connection(a), TreeNode::Connection(b)) => a.ptr_eq(b),
            (TreeNode::Database(a), TreeNode::Database(b)) => a.ptr_eq(b),
            (TreeNode::Collection(a), TreeNode::Collection(b)) => a.ptr_eq(b),
            (TreeNode::Documents(a), TreeNode::Documents(b)) => a.ptr_eq(b),
            (TreeNode::Document(a), TreeNode::Document(b)) => a.ptr_eq(b),
            (TreeNode::Schema(a), TreeNode::Schema(b)) => a.ptr_eq(b),
            (TreeNode::Field(a), TreeNode::Field(b)) => a.ptr_eq(b),
            (TreeNode::Indexes(a), TreeNode::Indexes(b)) => a.ptr_eq(b),
            (TreeNode::Index(a), TreeNode::Index(b)) => a.ptr_eq(b),
            (TreeNode::IndexField(a), TreeNode::IndexField(b)) => a.ptr_eq(b),
            (TreeNode::ChangeStream(a), TreeNode::ChangeStream(b)) => a.ptr_eq(b),
            (TreeNode::StreamProcessor(a), TreeNode::StreamProcessor(b)) => a.ptr_eq(b),
            (TreeNode::ShowMore(a), TreeNode::ShowMore(b)) => a.ptr_eq(b),
            (TreeNode::Message(a), TreeNode::Message(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let item = self.tree_item();
        f.debug_struct("TreeNode").field("key", &item.key).field("label", &item.label).finish()
    }
}
