//! In-memory doubles for the data source, connection manager and host window.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use mongodb::bson::Document;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use mango_explorer::connection::{ChangeEventStream, ConnectionManager, DataSource, FindOptions};
use mango_explorer::explorer::{HostWindow, InputBoxOptions};
use mango_explorer::models::{
    ChangeEvent, CollectionInfo, CollectionKind, DatabaseInfo, IndexDefinition, Namespace,
    StreamProcessorInfo,
};
use mango_explorer::state::{ConnectionEvent, ExplorerSettings, StatusMessage};
use mango_explorer::tree::{ExplorerContext, NodeContext};
use mango_explorer::{Error, Result};

// =============================================================================
// Data source
// =============================================================================

/// Scriptable `DataSource` that counts calls and fails on demand.
#[derive(Default)]
pub struct MockDataSource {
    databases: Mutex<Vec<String>>,
    collections: Mutex<HashMap<String, Vec<CollectionInfo>>>,
    documents: Mutex<HashMap<String, Vec<Document>>>,
    counts: Mutex<HashMap<String, u64>>,
    indexes: Mutex<HashMap<String, Vec<IndexDefinition>>>,
    stream_processors: Mutex<Vec<StreamProcessorInfo>>,
    stream_processing: AtomicBool,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    find_options: Mutex<Vec<FindOptions>>,
    find_delay: Mutex<Option<Duration>>,
    watchers: Mutex<HashMap<String, mpsc::UnboundedSender<Result<ChangeEvent>>>>,
}

impl MockDataSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_database(&self, name: &str) {
        let mut databases = self.databases.lock();
        if !databases.iter().any(|db| db == name) {
            databases.push(name.to_string());
        }
    }

    pub fn with_collection(&self, database: &str, name: &str, kind: CollectionKind) {
        self.with_database(database);
        let mut collections = self.collections.lock();
        let list = collections.entry(database.to_string()).or_default();
        list.retain(|info| info.name != name);
        list.push(CollectionInfo::new(name, kind));
    }

    pub fn with_documents(&self, namespace: &Namespace, documents: Vec<Document>) {
        self.documents.lock().insert(namespace.to_string(), documents);
    }

    /// Override the estimated count, which otherwise follows the stored documents.
    pub fn with_count(&self, namespace: &Namespace, count: u64) {
        self.counts.lock().insert(namespace.to_string(), count);
    }

    pub fn with_indexes(&self, namespace: &Namespace, indexes: Vec<IndexDefinition>) {
        self.indexes.lock().insert(namespace.to_string(), indexes);
    }

    pub fn with_stream_processor(&self, name: &str, state: &str) {
        self.stream_processing.store(true, Ordering::SeqCst);
        self.stream_processors
            .lock()
            .push(StreamProcessorInfo { name: name.to_string(), state: state.to_string() });
    }

    pub fn with_find_delay(&self, delay: Duration) {
        *self.find_delay.lock() = Some(delay);
    }

    /// Make every later call to `operation` fail.
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().remove(operation);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    /// Options passed to each `find`, oldest first.
    pub fn find_options(&self) -> Vec<FindOptions> {
        self.find_options.lock().clone()
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.databases.lock().iter().any(|db| db == name)
    }

    /// Push one change notification to the watcher of `namespace`.
    pub fn emit_change(&self, namespace: &Namespace, operation_type: &str, id: &str) -> bool {
        let event =
            ChangeEvent { operation_type: operation_type.to_string(), id: id.to_string() };
        match self.watchers.lock().get(&namespace.to_string()) {
            Some(sender) => sender.unbounded_send(Ok(event)).is_ok(),
            None => false,
        }
    }

    pub fn is_watching(&self, namespace: &Namespace) -> bool {
        self.watchers.lock().contains_key(&namespace.to_string())
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        *self.calls.lock().entry(operation).or_default() += 1;
        if self.failing.lock().contains(operation) {
            return Err(Error::Remote(format!("{operation} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        self.record("list_databases")?;
        Ok(self.databases.lock().iter().map(DatabaseInfo::new).collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionInfo>> {
        self.record("list_collections")?;
        Ok(self.collections.lock().get(database).cloned().unwrap_or_default())
    }

    async fn estimated_count(&self, namespace: &Namespace) -> Result<u64> {
        self.record("estimated_count")?;
        let key = namespace.to_string();
        if let Some(count) = self.counts.lock().get(&key) {
            return Ok(*count);
        }
        Ok(self.documents.lock().get(&key).map_or(0, |docs| docs.len() as u64))
    }

    async fn find(
        &self,
        namespace: &Namespace,
        _filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>> {
        self.record("find")?;
        self.find_options.lock().push(options.clone());

        let delay = *self.find_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut documents =
            self.documents.lock().get(&namespace.to_string()).cloned().unwrap_or_default();
        let descending = options
            .sort
            .as_ref()
            .and_then(|sort| sort.get_i32("_id").ok())
            .is_some_and(|direction| direction < 0);
        if descending {
            documents.reverse();
        }
        if let Some(limit) = options.limit {
            documents.truncate(limit.max(0) as usize);
        }
        Ok(documents)
    }

    async fn indexes(&self, namespace: &Namespace) -> Result<Vec<IndexDefinition>> {
        self.record("indexes")?;
        Ok(self.indexes.lock().get(&namespace.to_string()).cloned().unwrap_or_default())
    }

    async fn drop_collection(&self, namespace: &Namespace) -> Result<bool> {
        self.record("drop_collection")?;
        let mut collections = self.collections.lock();
        let Some(list) = collections.get_mut(&namespace.database) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|info| info.name != namespace.collection);
        Ok(before != list.len())
    }

    async fn drop_database(&self, database: &str) -> Result<bool> {
        self.record("drop_database")?;
        self.collections.lock().remove(database);
        let mut databases = self.databases.lock();
        let before = databases.len();
        databases.retain(|db| db != database);
        Ok(before != databases.len())
    }

    async fn drop_index(&self, namespace: &Namespace, name: &str) -> Result<bool> {
        self.record("drop_index")?;
        let mut indexes = self.indexes.lock();
        let Some(list) = indexes.get_mut(&namespace.to_string()) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|index| index.name != name);
        Ok(before != list.len())
    }

    fn is_stream_processing_instance(&self) -> bool {
        self.stream_processing.load(Ordering::SeqCst)
    }

    async fn list_stream_processors(&self) -> Result<Vec<StreamProcessorInfo>> {
        self.record("list_stream_processors")?;
        Ok(self.stream_processors.lock().clone())
    }

    async fn start_stream_processor(&self, name: &str) -> Result<()> {
        self.record("start_stream_processor")?;
        self.set_processor_state(name, "STARTED");
        Ok(())
    }

    async fn stop_stream_processor(&self, name: &str) -> Result<()> {
        self.record("stop_stream_processor")?;
        self.set_processor_state(name, "STOPPED");
        Ok(())
    }

    async fn drop_stream_processor(&self, name: &str) -> Result<bool> {
        self.record("drop_stream_processor")?;
        let mut processors = self.stream_processors.lock();
        let before = processors.len();
        processors.retain(|processor| processor.name != name);
        Ok(before != processors.len())
    }

    async fn watch(&self, namespace: &Namespace) -> Result<ChangeEventStream> {
        self.record("watch")?;
        let (sender, receiver) = mpsc::unbounded();
        self.watchers.lock().insert(namespace.to_string(), sender);
        Ok(receiver.boxed())
    }
}

impl MockDataSource {
    fn set_processor_state(&self, name: &str, state: &str) {
        if let Some(processor) =
            self.stream_processors.lock().iter_mut().find(|processor| processor.name == name)
        {
            processor.state = state.to_string();
        }
    }
}

// =============================================================================
// Connection manager
// =============================================================================

#[derive(Default)]
struct ManagerState {
    connections: Vec<(String, String)>,
    sources: HashMap<String, Arc<MockDataSource>>,
    active: Option<String>,
    connecting: Option<String>,
    disconnecting: bool,
    failing: HashSet<String>,
}

/// Connection manager whose endpoints are `MockDataSource`s.
pub struct MockConnectionManager {
    state: RwLock<ManagerState>,
    events: broadcast::Sender<ConnectionEvent>,
}

impl Default for MockConnectionManager {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self { state: RwLock::default(), events }
    }
}

impl MockConnectionManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Save an endpoint named `name`; its id is `{name}-id`.
    pub fn add(&self, name: &str) -> (String, Arc<MockDataSource>) {
        let id = format!("{name}-id");
        let source = MockDataSource::new();
        {
            let mut state = self.state.write();
            state.connections.push((id.clone(), name.to_string()));
            state.sources.insert(id.clone(), source.clone());
        }
        let _ = self.events.send(ConnectionEvent::ConnectionsDidChange);
        (id, source)
    }

    pub fn set_active(&self, id: Option<&str>) {
        self.state.write().active = id.map(str::to_string);
    }

    pub fn set_connecting(&self, id: Option<&str>) {
        self.state.write().connecting = id.map(str::to_string);
    }

    pub fn set_disconnecting(&self, disconnecting: bool) {
        self.state.write().disconnecting = disconnecting;
    }

    pub fn fail_connect(&self, id: &str) {
        self.state.write().failing.insert(id.to_string());
    }

    /// Replace the source of `id`, as a reconnect would.
    pub fn replace_source(&self, id: &str) -> Arc<MockDataSource> {
        let source = MockDataSource::new();
        self.state.write().sources.insert(id.to_string(), source.clone());
        source
    }

    pub fn emit(&self, event: ConnectionEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    fn connection_ids(&self) -> Vec<String> {
        self.state.read().connections.iter().map(|(id, _)| id.clone()).collect()
    }

    fn connection_name(&self, id: &str) -> Option<String> {
        let state = self.state.read();
        state.connections.iter().find(|(cid, _)| cid == id).map(|(_, name)| name.clone())
    }

    fn active_connection_id(&self) -> Option<String> {
        self.state.read().active.clone()
    }

    fn connecting_connection_id(&self) -> Option<String> {
        self.state.read().connecting.clone()
    }

    fn is_connecting(&self) -> bool {
        self.state.read().connecting.is_some()
    }

    fn is_disconnecting(&self) -> bool {
        self.state.read().disconnecting
    }

    fn active_data_source(&self) -> Option<Arc<dyn DataSource>> {
        let state = self.state.read();
        let active = state.active.as_ref()?;
        state.sources.get(active).map(|source| source.clone() as Arc<dyn DataSource>)
    }

    async fn connect_with_connection_id(&self, id: &str) -> Result<bool> {
        if self.state.read().failing.contains(id) {
            return Err(Error::Remote(format!("Unable to connect to {id}")));
        }
        self.state.write().active = Some(id.to_string());
        let _ = self.events.send(ConnectionEvent::Connected(id.to_string()));
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }
}

// =============================================================================
// Host window
// =============================================================================

/// Records notices and answers input boxes from a script.
#[derive(Default)]
pub struct RecordingWindow {
    messages: Mutex<Vec<StatusMessage>>,
    answers: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
    validations: Mutex<Vec<Option<String>>>,
    prompt_error: AtomicBool,
}

impl RecordingWindow {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the next input box answer; `None` dismisses the box.
    pub fn answer(&self, answer: Option<&str>) {
        self.answers.lock().push_back(answer.map(str::to_string));
    }

    pub fn fail_prompts(&self) {
        self.prompt_error.store(true, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<StatusMessage> {
        self.messages.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages.lock().iter().filter(|m| m.is_error()).map(|m| m.text.clone()).collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages.lock().iter().filter(|m| !m.is_error()).map(|m| m.text.clone()).collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Validator output for each answered prompt.
    pub fn validations(&self) -> Vec<Option<String>> {
        self.validations.lock().clone()
    }
}

#[async_trait]
impl HostWindow for RecordingWindow {
    fn show_message(&self, message: StatusMessage) {
        self.messages.lock().push(message);
    }

    async fn show_input_box(&self, options: InputBoxOptions) -> Result<Option<String>> {
        self.prompts.lock().push(options.prompt.clone());
        if self.prompt_error.load(Ordering::SeqCst) {
            return Err(Error::Remote("input box closed".into()));
        }
        let answer = self.answers.lock().pop_front().flatten();
        let validation = answer.as_deref().and_then(|text| options.validation_message(text));
        self.validations.lock().push(validation);
        Ok(answer)
    }
}

// =============================================================================
// Sessions
// =============================================================================

/// A node context over fresh doubles.
pub struct Session {
    pub window: Arc<RecordingWindow>,
    pub source: Arc<MockDataSource>,
    pub ctx: NodeContext,
}

pub const CONNECTION_ID: &str = "conn-1";

pub fn session() -> Session {
    session_with(ExplorerSettings::default())
}

pub fn session_with(settings: ExplorerSettings) -> Session {
    let window = RecordingWindow::new();
    let source = MockDataSource::new();
    let explorer = ExplorerContext::new(window.clone(), settings);
    let ctx = NodeContext::new(CONNECTION_ID, source.clone(), explorer);
    Session { window, source, ctx }
}
