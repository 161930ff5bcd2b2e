//! Live change notifications for one collection.

use crate::models::{Namespace, TreeNodeId};
use crate::state::ChangeStreamRegistry;
use crate::tree::context::NodeContext;
use crate::tree::node::{ExpandableNode, Node, TreeNode};
use crate::tree::{CollapsibleState, MessageNode, TreeItem};

pub const LISTENING_LABEL: &str = "Listening for changes...";
pub const CHANGE_STREAM_CONTEXT: &str = "changeStreamItem";

#[derive(Clone)]
pub struct ChangeStreamState {
    namespace: Namespace,
    ctx: NodeContext,
    is_expanded: bool,
}

impl ExpandableNode for ChangeStreamState {
    fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    /// Events live in the session registry, never in the node.
    fn cache_is_up_to_date(&self) -> bool {
        true
    }
}

pub type ChangeStreamNode = Node<ChangeStreamState>;

impl ChangeStreamNode {
    pub fn new(namespace: Namespace, ctx: NodeContext) -> Self {
        Self::from_state(ChangeStreamState { namespace, ctx, is_expanded: false })
    }

    pub fn registry_key(&self) -> String {
        let state = self.lock();
        ChangeStreamRegistry::key(&state.ctx.connection_id, &state.namespace)
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        TreeItem::new(
            TreeNodeId::ChangeStream {
                connection: state.ctx.connection_id.clone(),
                namespace: state.namespace.clone(),
            },
            "Change Stream",
            CollapsibleState::from_expanded(state.is_expanded),
        )
        .with_tooltip("Expand to follow changes")
        .with_context(CHANGE_STREAM_CONTEXT)
        .with_icon("play")
    }

    /// Starts the session listener on first use; events are listed newest first.
    pub fn children(&self) -> Vec<TreeNode> {
        let (namespace, ctx, is_expanded) = {
            let state = self.lock();
            (state.namespace.clone(), state.ctx.clone(), state.is_expanded)
        };

        if !is_expanded {
            return Vec::new();
        }

        let registry = &ctx.explorer.change_streams;
        let key = ChangeStreamRegistry::key(&ctx.connection_id, &namespace);
        if !registry.is_listening(&key) {
            registry.listen(
                &key,
                ctx.source.clone(),
                namespace.clone(),
                ctx.explorer.signal.clone(),
            );
        }

        let events = registry.events(&key);
        if events.is_empty() {
            let message_key = TreeNodeId::Transient(format!("watch-idle:{key}"));
            return vec![TreeNode::Message(MessageNode::new(message_key, LISTENING_LABEL))];
        }

        let total = events.len();
        events
            .into_iter()
            .enumerate()
            .map(|(position, event)| {
                let message_key =
                    TreeNodeId::Transient(format!("watch:{key}:{}", total - position));
                TreeNode::Message(
                    MessageNode::new(message_key, event.operation_type)
                        .with_description(event.id)
                        .with_context(CHANGE_STREAM_CONTEXT),
                )
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

    /// Stop this collection's listener and forget its events.
    pub fn stop_listening(&self) -> bool {
        let key = self.registry_key();
        let registry = self.lock().ctx.explorer.change_streams.clone();
        registry.stop(&key)
    }
}
