//! Terminal rows: pagination sentinels and plain messages.

use crate::models::{Namespace, TreeNodeId};
use crate::tree::node::Node;
use crate::tree::{CollapsibleState, DocumentListNode, SchemaNode, TreeItem};

pub const SHOW_MORE_DOCUMENTS_LABEL: &str = "Show more...";
pub const SHOW_MORE_FIELDS_LABEL: &str = "Show more fields...";

/// The list a sentinel grows when selected.
#[derive(Clone)]
pub enum ShowMoreTarget {
    Documents(DocumentListNode),
    Schema(SchemaNode),
}

#[derive(Clone)]
pub struct ShowMoreState {
    id: String,
    label: &'static str,
    target: ShowMoreTarget,
}

/// "Show more" sentinel appended after a paginated list.
pub type ShowMoreNode = Node<ShowMoreState>;

impl ShowMoreNode {
    /// Unique per window so a selected sentinel is deselected once replaced.
    pub(crate) fn new(namespace: &Namespace, shown: usize, target: ShowMoreTarget) -> Self {
        let label = match target {
            ShowMoreTarget::Documents(_) => SHOW_MORE_DOCUMENTS_LABEL,
            ShowMoreTarget::Schema(_) => SHOW_MORE_FIELDS_LABEL,
        };
        let id = format!("show-more-{namespace}-{shown}-{}", uuid::Uuid::new_v4().simple());
        Self::from_state(ShowMoreState { id, label, target })
    }

    pub fn id(&self) -> String {
        self.lock().id.clone()
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        TreeItem::new(
            TreeNodeId::Transient(state.id.clone()),
            state.label,
            CollapsibleState::None,
        )
        .with_id(state.id.clone())
        .with_context("showMoreTreeItem")
    }

    /// Grow the owning list and mark it stale.
    pub fn on_show_more_clicked(&self) {
        let target = self.lock().target.clone();
        log::info!("show more clicked");
        match target {
            ShowMoreTarget::Documents(list) => list.on_show_more_clicked(),
            ShowMoreTarget::Schema(schema) => schema.on_show_more_clicked(),
        }
    }
}

#[derive(Clone)]
pub struct MessageState {
    key: TreeNodeId,
    label: String,
    description: Option<String>,
    context_value: Option<&'static str>,
}

/// Read-only row with a label and optional description.
pub type MessageNode = Node<MessageState>;

impl MessageNode {
    pub fn new(key: TreeNodeId, label: impl Into<String>) -> Self {
        Self::from_state(MessageState {
            key,
            label: label.into(),
            description: None,
            context_value: None,
        })
    }

    pub(crate) fn with_description(self, description: impl Into<String>) -> Self {
        self.lock().description = Some(description.into());
        self
    }

    pub(crate) fn with_context(self, context_value: &'static str) -> Self {
        self.lock().context_value = Some(context_value);
        self
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        let mut item =
            TreeItem::new(state.key.clone(), state.label.clone(), CollapsibleState::None);
        item.description = state.description.clone();
        item.context_value = state.context_value;
        item
    }
}
