// Data structures and types

pub mod catalog;
pub mod connection;
mod namespace;
mod tree_node_id;

pub use catalog::{
    ChangeEvent, CollectionInfo, CollectionKind, DatabaseInfo, IndexDefinition, IndexKeyType,
    StreamProcessorInfo,
};
pub use connection::{ConnectionStatus, SavedConnection};
pub use namespace::Namespace;
pub use tree_node_id::TreeNodeId;
