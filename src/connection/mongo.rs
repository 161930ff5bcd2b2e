//! `DataSource` backed by the official MongoDB driver.

use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::Client;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::IndexVersion;
use mongodb::results::CollectionType;

use crate::bson::DocumentKey;
use crate::connection::source::{ChangeEventStream, DataSource};
use crate::connection::types::FindOptions;
use crate::error::{Error, Result};
use crate::models::{
    ChangeEvent, CollectionInfo, CollectionKind, DatabaseInfo, IndexDefinition, Namespace,
    StreamProcessorInfo,
};

const STREAM_PROCESSING_HOST_PREFIX: &str = "atlas-stream-";

/// A connected MongoDB deployment.
#[derive(Clone)]
pub struct MongoDataSource {
    client: Client,
    stream_processing: bool,
}

impl MongoDataSource {
    pub fn new(client: Client, uri: &str) -> Self {
        Self { client, stream_processing: is_stream_processing_uri(uri) }
    }

    /// Connect and verify the deployment answers a ping within `timeout`.
    pub async fn connect(uri: &str, timeout: Duration) -> Result<Self> {
        let fut = async {
            let client = Client::with_uri_str(uri).await?;
            client.database("admin").run_command(doc! { "ping": 1 }).await?;
            Ok::<Client, mongodb::error::Error>(client)
        };

        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => Ok(Self::new(result?, uri)),
            Err(_) => Err(Error::Timeout("Connection timed out".to_string())),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn collection(&self, namespace: &Namespace) -> mongodb::Collection<Document> {
        self.client.database(&namespace.database).collection::<Document>(&namespace.collection)
    }

    async fn admin_command(&self, command: Document) -> Result<Document> {
        Ok(self.client.database("admin").run_command(command).await?)
    }
}

/// True when any host in a connection string belongs to a stream processing instance.
pub fn is_stream_processing_uri(uri: &str) -> bool {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let hosts = rest.split(['/', '?']).next().unwrap_or_default();
    let hosts = hosts.rsplit_once('@').map_or(hosts, |(_, hosts)| hosts);
    hosts.split(',').any(|host| host.trim().starts_with(STREAM_PROCESSING_HOST_PREFIX))
}

fn collection_kind(kind: &CollectionType) -> CollectionKind {
    match kind {
        CollectionType::View => CollectionKind::View,
        CollectionType::Timeseries => CollectionKind::Timeseries,
        _ => CollectionKind::Collection,
    }
}

#[allow(unreachable_patterns)]
fn index_version(version: &IndexVersion) -> Option<i32> {
    match version {
        IndexVersion::V0 => Some(0),
        IndexVersion::V1 => Some(1),
        IndexVersion::V2 => Some(2),
        IndexVersion::Custom(n) => i32::try_from(*n).ok(),
        _ => None,
    }
}

fn operation_name(operation: &mongodb::change_stream::event::OperationType) -> String {
    match mongodb::bson::to_bson(operation) {
        Ok(Bson::String(name)) => name,
        _ => "unknown".to_string(),
    }
}

#[async_trait]
impl DataSource for MongoDataSource {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        let names = self.client.list_database_names().await?;
        Ok(names.into_iter().map(DatabaseInfo::new).collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionInfo>> {
        let cursor = self.client.database(database).list_collections().await?;
        let specs: Vec<_> = cursor.try_collect().await?;
        Ok(specs
            .into_iter()
            .map(|spec| CollectionInfo::new(spec.name, collection_kind(&spec.collection_type)))
            .collect())
    }

    async fn estimated_count(&self, namespace: &Namespace) -> Result<u64> {
        Ok(self.collection(namespace).estimated_document_count().await?)
    }

    async fn find(
        &self,
        namespace: &Namespace,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>> {
        let mut find_options = mongodb::options::FindOptions::default();
        find_options.limit = options.limit;
        find_options.sort = options.sort;

        let cursor = self.collection(namespace).find(filter).with_options(find_options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn indexes(&self, namespace: &Namespace) -> Result<Vec<IndexDefinition>> {
        let cursor = self.collection(namespace).list_indexes().await?;
        let models: Vec<mongodb::IndexModel> = cursor.try_collect().await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let options = model.options.unwrap_or_default();
                IndexDefinition {
                    name: options.name.unwrap_or_default(),
                    key: model.keys,
                    version: options.version.as_ref().and_then(index_version),
                }
            })
            .collect())
    }

    async fn drop_collection(&self, namespace: &Namespace) -> Result<bool> {
        self.collection(namespace).drop().await?;
        Ok(true)
    }

    async fn drop_database(&self, database: &str) -> Result<bool> {
        self.client.database(database).drop().await?;
        Ok(true)
    }

    async fn drop_index(&self, namespace: &Namespace, name: &str) -> Result<bool> {
        self.collection(namespace).drop_index(name).await?;
        Ok(true)
    }

    fn is_stream_processing_instance(&self) -> bool {
        self.stream_processing
    }

    async fn list_stream_processors(&self) -> Result<Vec<StreamProcessorInfo>> {
        let reply = self.admin_command(doc! { "listStreamProcessors": 1 }).await?;
        let processors = reply.get_array("streamProcessors").map_err(|err| {
            Error::Remote(format!("Malformed listStreamProcessors reply: {err}"))
        })?;

        Ok(processors
            .iter()
            .filter_map(Bson::as_document)
            .map(|sp| StreamProcessorInfo {
                name: sp.get_str("name").unwrap_or_default().to_string(),
                state: sp.get_str("state").unwrap_or_default().to_string(),
            })
            .collect())
    }

    async fn start_stream_processor(&self, name: &str) -> Result<()> {
        self.admin_command(doc! { "startStreamProcessor": name }).await?;
        Ok(())
    }

    async fn stop_stream_processor(&self, name: &str) -> Result<()> {
        self.admin_command(doc! { "stopStreamProcessor": name }).await?;
        Ok(())
    }

    async fn drop_stream_processor(&self, name: &str) -> Result<bool> {
        self.admin_command(doc! { "dropStreamProcessor": name }).await?;
        Ok(true)
    }

    async fn watch(&self, namespace: &Namespace) -> Result<ChangeEventStream> {
        let stream = self.collection(namespace).watch().await?;
        Ok(stream
            .map(|event| -> Result<ChangeEvent> {
                let event = event?;
                let id = event
                    .document_key
                    .as_ref()
                    .and_then(|key| key.get("_id"))
                    .map(|id| DocumentKey::from_id(id).to_string())
                    .unwrap_or_default();
                Ok(ChangeEvent { operation_type: operation_name(&event.operation_type), id })
            })
            .boxed())
    }
}
