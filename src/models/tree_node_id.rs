//! Type-safe tree node identifiers.

use std::fmt;

use crate::models::Namespace;

/// Stable identity of a node in the explorer tree.
/// Node instances are rebuilt on every pass; this key is what survives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TreeNodeId {
    Connection(String),
    Database { connection: String, database: String },
    Collection { connection: String, namespace: Namespace },
    Documents { connection: String, namespace: Namespace },
    Document { connection: String, namespace: Namespace, index: usize },
    Schema { connection: String, namespace: Namespace },
    Field { connection: String, namespace: Namespace, path: String },
    Indexes { connection: String, namespace: Namespace },
    Index { connection: String, namespace: Namespace, name: String },
    IndexField { connection: String, namespace: Namespace, index: String, key: String },
    ChangeStream { connection: String, namespace: Namespace },
    StreamProcessor { connection: String, name: String },
    /// Sentinels and plain messages, keyed by an instance-unique string.
    Transient(String),
}

impl TreeNodeId {
    pub fn connection(id: impl Into<String>) -> Self {
        Self::Connection(id.into())
    }

    pub fn database(connection: impl Into<String>, database: impl Into<String>) -> Self {
        Self::Database { connection: connection.into(), database: database.into() }
    }

    pub fn collection(connection: impl Into<String>, namespace: Namespace) -> Self {
        Self::Collection { connection: connection.into(), namespace }
    }

    /// Get the connection id, if the node belongs to one.
    pub fn connection_id(&self) -> Option<&str> {
        match self {
            Self::Connection(id) => Some(id),
            Self::Database { connection, .. }
            | Self::Collection { connection, .. }
            | Self::Documents { connection, .. }
            | Self::Document { connection, .. }
            | Self::Schema { connection, .. }
            | Self::Field { connection, .. }
            | Self::Indexes { connection, .. }
            | Self::Index { connection, .. }
            | Self::IndexField { connection, .. }
            | Self::ChangeStream { connection, .. }
            | Self::StreamProcessor { connection, .. } => Some(connection),
            Self::Transient(_) => None,
        }
    }

    /// Get the namespace if this node lives below a collection.
    pub fn namespace(&self) -> Option<&Namespace> {
        match self {
            Self::Collection { namespace, .. }
            | Self::Documents { namespace, .. }
            | Self::Document { namespace, .. }
            | Self::Schema { namespace, .. }
            | Self::Field { namespace, .. }
            | Self::Indexes { namespace, .. }
            | Self::Index { namespace, .. }
            | Self::IndexField { namespace, .. }
            | Self::ChangeStream { namespace, .. } => Some(namespace),
            _ => None,
        }
    }

    /// String form used as the host's tree item id.
    pub fn to_tree_id(&self) -> String {
        match self {
            Self::Connection(id) => format!("conn:{id}"),
            Self::Database { connection, database } => format!("db:{connection}:{database}"),
            Self::Collection { connection, namespace } => format!("col:{connection}:{namespace}"),
            Self::Documents { connection, namespace } => format!("docs:{connection}:{namespace}"),
            Self::Document { connection, namespace, index } => {
                format!("doc:{connection}:{namespace}:{index}")
            }
            Self::Schema { connection, namespace } => format!("schema:{connection}:{namespace}"),
            Self::Field { connection, namespace, path } => {
                format!("field:{connection}:{namespace}:{path}")
            }
            Self::Indexes { connection, namespace } => format!("indexes:{connection}:{namespace}"),
            Self::Index { connection, namespace, name } => {
                format!("index:{connection}:{namespace}:{name}")
            }
            Self::IndexField { connection, namespace, index, key } => {
                format!("index-key:{connection}:{namespace}:{index}:{key}")
            }
            Self::ChangeStream { connection, namespace } => {
                format!("watch:{connection}:{namespace}")
            }
            Self::StreamProcessor { connection, name } => format!("sp:{connection}:{name}"),
            Self::Transient(id) => id.clone(),
        }
    }
}

impl fmt::Display for TreeNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tree_id())
    }
}
