//! The remote data source consumed by the tree.

use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::bson::Document;

use crate::connection::types::FindOptions;
use crate::error::{Error, Result};
use crate::models::{
    ChangeEvent, CollectionInfo, DatabaseInfo, IndexDefinition, Namespace, StreamProcessorInfo,
};

/// Stream of change notifications for one namespace.
pub type ChangeEventStream = BoxStream<'static, Result<ChangeEvent>>;

/// Operations the explorer tree needs from a connected server.
///
/// Every call is asynchronous and may fail. Implementations are shared read-only
/// by every node below one connection.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>>;

    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionInfo>>;

    async fn estimated_count(&self, namespace: &Namespace) -> Result<u64>;

    async fn find(
        &self,
        namespace: &Namespace,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>>;

    async fn indexes(&self, namespace: &Namespace) -> Result<Vec<IndexDefinition>>;

    async fn drop_collection(&self, namespace: &Namespace) -> Result<bool>;

    async fn drop_database(&self, database: &str) -> Result<bool>;

    async fn drop_index(&self, namespace: &Namespace, name: &str) -> Result<bool> {
        let _ = (namespace, name);
        Err(Error::Unsupported("drop index".into()))
    }

    /// Whether the endpoint is an Atlas stream processing instance.
    fn is_stream_processing_instance(&self) -> bool {
        false
    }

    async fn list_stream_processors(&self) -> Result<Vec<StreamProcessorInfo>> {
        Err(Error::Unsupported("list stream processors".into()))
    }

    async fn start_stream_processor(&self, name: &str) -> Result<()> {
        let _ = name;
        Err(Error::Unsupported("start stream processor".into()))
    }

    async fn stop_stream_processor(&self, name: &str) -> Result<()> {
        let _ = name;
        Err(Error::Unsupported("stop stream processor".into()))
    }

    async fn drop_stream_processor(&self, name: &str) -> Result<bool> {
        let _ = name;
        Err(Error::Unsupported("drop stream processor".into()))
    }

    async fn watch(&self, namespace: &Namespace) -> Result<ChangeEventStream> {
        let _ = namespace;
        Err(Error::Unsupported("change streams".into()))
    }
}
