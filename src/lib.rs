//! Lazy, incrementally cached MongoDB explorer tree.
//!
//! The host asks [`ExplorerTreeController`] for roots and children and forwards
//! expand, collapse and selection events. Nodes fetch from a [`DataSource`] only
//! when expanded with a stale cache, and hand out fresh instances on every pass.

pub mod bson;
pub mod connection;
pub mod error;
pub mod explorer;
pub mod helpers;
pub mod models;
pub mod schema;
pub mod state;
pub mod tree;

pub use connection::{ConnectionManager, DataSource, MongoConnectionManager, MongoDataSource};
pub use error::{Error, Result};
pub use explorer::{ExplorerTreeController, HostWindow, InputBoxOptions};
pub use state::{ConfigManager, ExplorerSettings, StatusLevel, StatusMessage};
pub use tree::{CollapsibleState, TreeItem, TreeNode};
