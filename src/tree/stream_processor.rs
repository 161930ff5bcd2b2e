use crate::error::Result;
use crate::explorer::confirm::drop_with_confirmation;
use crate::models::{StreamProcessorInfo, TreeNodeId};
use crate::tree::context::NodeContext;
use crate::tree::node::{ExpandableNode, Node, TreeNode};
use crate::tree::{CollapsibleState, MessageNode, TreeItem};

#[derive(Clone)]
pub struct StreamProcessorState {
    name: String,
    state: String,
    ctx: NodeContext,
    is_expanded: bool,
    is_dropped: bool,
}

impl ExpandableNode for StreamProcessorState {
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

/// A processor on an Atlas stream processing instance.
pub type StreamProcessorNode = Node<StreamProcessorState>;

impl StreamProcessorNode {
    pub fn new(info: StreamProcessorInfo, ctx: NodeContext) -> Self {
        Self::from_state(StreamProcessorState {
            name: info.name,
            state: info.state,
            ctx,
            is_expanded: false,
            is_dropped: false,
        })
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn state(&self) -> String {
        self.lock().state.clone()
    }

    pub(crate) fn set_state(&self, state: String) {
        self.lock().state = state;
    }

    pub fn tree_item(&self) -> TreeItem {
        let state = self.lock();
        TreeItem::new(
            TreeNodeId::StreamProcessor {
                connection: state.ctx.connection_id.clone(),
                name: state.name.clone(),
            },
            state.name.clone(),
            CollapsibleState::from_expanded(state.is_expanded),
        )
        .with_tooltip(state.name.clone())
        .with_context("streamProcessorTreeItem")
        .with_icon("stream-processor")
    }

    pub fn children(&self) -> Vec<TreeNode> {
        let state = self.lock();
        if !state.is_expanded {
            return Vec::new();
        }
        let key = TreeNodeId::Transient(format!(
            "sp-state:{}:{}",
            state.ctx.connection_id, state.name
        ));
        vec![TreeNode::Message(MessageNode::new(key, format!("State: {}", state.state)))]
    }

    pub fn on_expand(&self) -> bool {
        self.lock().is_expanded = true;
        true
    }

    pub fn on_collapse(&self) {
        self.lock().is_expanded = false;
    }

    pub async fn on_start_clicked(&self) -> bool {
        let (name, ctx) = self.name_and_context();
        match ctx.source.start_stream_processor(&name).await {
            Ok(()) => {
                self.set_state("STARTED".to_string());
                true
            }
            Err(err) => {
                ctx.explorer.notify_error(format!("Start stream processor failed: {err}"));
                false
            }
        }
    }

    pub async fn on_stop_clicked(&self) -> bool {
        let (name, ctx) = self.name_and_context();
        match ctx.source.stop_stream_processor(&name).await {
            Ok(()) => {
                self.set_state("STOPPED".to_string());
                true
            }
            Err(err) => {
                ctx.explorer.notify_error(format!("Stop stream processor failed: {err}"));
                false
            }
        }
    }

    /// Drop the processor after the user retypes its name.
    pub async fn on_drop_clicked(&self) -> Result<bool> {
        let (name, ctx) = self.name_and_context();

        let dropped = drop_with_confirmation(&ctx.explorer, "stream processor", &name, || {
            ctx.source.drop_stream_processor(&name)
        })
        .await?;

        if dropped {
            let mut state = self.lock();
            state.is_dropped = true;
            state.state = "DROPPED".to_string();
        }
        Ok(dropped)
    }

    fn name_and_context(&self) -> (String, NodeContext) {
        let state = self.lock();
        (state.name.clone(), state.ctx.clone())
    }
}
