//! Shared test support: in-memory doubles (`mock`) and a MongoDB test server.
//!
//! Tests that need a real server share one MongoDB 7.0 container per test
//! binary. Each `MongoServer` handle suffixes database names with a short id so
//! tests never see each other's data.
//!
//! The container is owned by a parked background thread with its own runtime,
//! so it outlives the per-test `#[tokio::test]` runtimes. It is removed with
//! `docker rm -f` when the process exits.

#![allow(dead_code)]

pub mod fixtures;
pub mod mock;

use std::sync::OnceLock;
use std::time::Duration;

use mango_explorer::MongoDataSource;
use mango_explorer::models::Namespace;
use mongodb::bson::{Document, doc};
use mongodb::{Client, options::ClientOptions};
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;

const MONGO_TAG: &str = "7.0";
const READY_ATTEMPTS: usize = 30;

static SERVER_URI: OnceLock<String> = OnceLock::new();
static CONTAINER_ID: OnceLock<String> = OnceLock::new();

unsafe extern "C" {
    fn atexit(f: extern "C" fn()) -> i32;
}

extern "C" fn remove_container() {
    let Some(id) = CONTAINER_ID.get() else {
        return;
    };
    let _ = std::process::Command::new("docker")
        .args(["rm", "-f", id])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status();
}

/// Start the container on first use and return its connection string.
fn server_uri() -> &'static str {
    SERVER_URI.get_or_init(|| {
        let (tx, rx) = std::sync::mpsc::sync_channel(1);

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build container runtime");

            runtime.block_on(async {
                let container = Mongo::default()
                    .with_tag(MONGO_TAG)
                    .start()
                    .await
                    .expect("Failed to start MongoDB container");

                let _ = CONTAINER_ID.set(container.id().to_string());
                unsafe {
                    atexit(remove_container);
                }

                let host = container.get_host().await.expect("Failed to get host");
                let port = container.get_host_port_ipv4(27017).await.expect("Failed to get port");
                let uri = format!("mongodb://{host}:{port}");
                wait_until_ready(&uri).await;

                tx.send(uri).expect("Failed to publish server uri");
                std::future::pending::<()>().await;
            });
        });

        rx.recv().expect("MongoDB container never became available")
    })
}

async fn wait_until_ready(uri: &str) {
    let options = ClientOptions::parse(uri).await.expect("Failed to parse uri");
    let probe = Client::with_options(options).expect("Failed to create probe client");
    for _ in 0..READY_ATTEMPTS {
        if probe.list_database_names().await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Handle to the shared server with per-test database names.
pub struct MongoServer {
    pub client: Client,
    pub connection_string: String,
    suffix: String,
}

impl MongoServer {
    /// Connect a fresh client on the calling test's runtime.
    pub async fn start() -> Self {
        let connection_string = server_uri().to_string();
        let options =
            ClientOptions::parse(&connection_string).await.expect("Failed to parse uri");
        let client = Client::with_options(options).expect("Failed to create client");
        let suffix = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();

        Self { client, connection_string, suffix }
    }

    /// Database name as it exists on the server for this test.
    pub fn db_name(&self, name: &str) -> String {
        format!("{name}_{}", self.suffix)
    }

    pub fn database(&self, name: &str) -> mongodb::Database {
        self.client.database(&self.db_name(name))
    }

    pub fn collection<T: Send + Sync>(&self, db: &str, collection: &str) -> mongodb::Collection<T> {
        self.database(db).collection(collection)
    }

    /// Namespace matching `collection(db, collection)`.
    pub fn namespace(&self, db: &str, collection: &str) -> Namespace {
        Namespace::new(self.db_name(db), collection)
    }

    /// A data source connected to the shared server.
    pub async fn data_source(&self) -> MongoDataSource {
        MongoDataSource::connect(&self.connection_string, Duration::from_secs(10))
            .await
            .expect("Failed to connect data source")
    }
}

/// A small document with a name.
pub fn test_document(name: &str) -> Document {
    doc! {
        "name": name,
        "value": 42,
        "active": true,
    }
}
