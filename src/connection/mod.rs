//! Remote data access for the explorer tree.
//!
//! - `DataSource`: operations the tree consumes from a connected server
//! - `MongoDataSource`: `DataSource` over the MongoDB driver
//! - `ConnectionManager`: active/connecting endpoint bookkeeping
//! - `types`: shared option types

pub mod manager;
pub mod mongo;
pub mod source;
pub mod types;

pub use manager::{ConnectionManager, MongoConnectionManager};
pub use mongo::MongoDataSource;
pub use source::{ChangeEventStream, DataSource};
pub use types::{FindOptions, PreviewOptions, PreviewSort};
