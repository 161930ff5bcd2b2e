//! The explorer tree: node kinds, reconciliation and the host-facing item.
//!
//! Every node is a [`Node`] handle over its own state. A node owns its child
//! cache, tracks whether that cache is current, and rebuilds children into
//! fresh instances on each pass so their expansion survives parent rebuilds.

mod change_stream;
mod collection;
mod connection;
pub mod context;
mod database;
mod documents;
mod indexes;
mod item;
mod leaf;
pub mod node;
pub mod reconcile;
mod schema;
mod stream_processor;

pub use change_stream::{ChangeStreamNode, ChangeStreamState, LISTENING_LABEL};
pub use collection::{CollectionNode, CollectionState};
pub use connection::{
    CONNECTED_CONTEXT, ConnectionNode, ConnectionState, DISCONNECTED_CONTEXT,
};
pub use context::{ExplorerContext, NodeContext};
pub use database::{DatabaseNode, DatabaseState};
pub use documents::{
    DocumentListNode, DocumentListState, DocumentNode, DocumentState, RefreshCount,
};
pub use indexes::{
    IndexFieldNode, IndexFieldState, IndexListNode, IndexListState, IndexNode, IndexState,
};
pub use item::{CollapsibleState, TreeItem};
pub use leaf::{
    MessageNode, MessageState, SHOW_MORE_DOCUMENTS_LABEL, SHOW_MORE_FIELDS_LABEL, ShowMoreNode,
    ShowMoreState, ShowMoreTarget,
};
pub use node::{ExpandableNode, Node, TreeNode};
pub use schema::{FieldNode, FieldState, NO_DOCUMENTS_NOTICE, SchemaNode, SchemaState};
pub use stream_processor::{StreamProcessorNode, StreamProcessorState};
