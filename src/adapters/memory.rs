//! In-memory stand-ins for S3, Glue and Athena.
//!
//! Every call is recorded so callers can check how often each operation ran.
//! Clones share state.

use crate::domain::model::{BucketProbe, QueryHandle, QueryRequest, TableDefinition};
use crate::domain::ports::{Catalog, ObjectStore, QueryEngine};
use crate::utils::error::{LakeError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct ObjectStoreState {
    buckets: HashMap<String, HashMap<String, Vec<u8>>>,
    // 建立後仍回報 NotFound 的探測次數，模擬最終一致性
    visibility_lag: usize,
    hidden_probes: HashMap<String, usize>,
    probe_failure: Option<String>,
    probe_calls: usize,
    create_calls: usize,
    put_calls: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    state: Arc<Mutex<ObjectStoreState>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `bucket` already present.
    pub async fn with_bucket(self, bucket: &str) -> Self {
        self.state
            .lock()
            .await
            .buckets
            .insert(bucket.to_string(), HashMap::new());
        self
    }

    /// Newly created buckets report `NotFound` for the next `probes` probes.
    pub async fn with_visibility_lag(self, probes: usize) -> Self {
        self.state.lock().await.visibility_lag = probes;
        self
    }

    /// Every probe fails with a non-"not found" error carrying `message`.
    pub async fn failing_probes(self, message: &str) -> Self {
        self.state.lock().await.probe_failure = Some(message.to_string());
        self
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().await;
        state.buckets.get(bucket).and_then(|b| b.get(key)).cloned()
    }

    pub async fn bucket_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state.buckets.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn probe_calls(&self) -> usize {
        self.state.lock().await.probe_calls
    }

    pub async fn create_calls(&self) -> usize {
        self.state.lock().await.create_calls
    }

    pub async fn put_calls(&self) -> usize {
        self.state.lock().await.put_calls
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn probe_bucket(&self, bucket: &str) -> Result<BucketProbe> {
        let mut state = self.state.lock().await;
        state.probe_calls += 1;

        if let Some(message) = &state.probe_failure {
            return Err(LakeError::storage("HeadBucket", message.clone()));
        }

        if let Some(remaining) = state.hidden_probes.get_mut(bucket) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(BucketProbe::NotFound);
            }
        }

        if state.buckets.contains_key(bucket) {
            Ok(BucketProbe::Exists)
        } else {
            Ok(BucketProbe::NotFound)
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.create_calls += 1;

        if state.buckets.contains_key(bucket) {
            return Err(LakeError::storage(
                "CreateBucket",
                format!("BucketAlreadyOwnedByYou: {}", bucket),
            ));
        }

        state.buckets.insert(bucket.to_string(), HashMap::new());
        let lag = state.visibility_lag;
        state.hidden_probes.insert(bucket.to_string(), lag);
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_length: i64,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.put_calls += 1;

        if content_length != body.len() as i64 {
            return Err(LakeError::storage(
                "PutObject",
                format!(
                    "content length {} does not match body of {} bytes",
                    content_length,
                    body.len()
                ),
            ));
        }

        let objects = state.buckets.get_mut(bucket).ok_or_else(|| {
            LakeError::storage("PutObject", format!("NoSuchBucket: {}", bucket))
        })?;
        objects.insert(key.to_string(), body);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    databases: HashMap<String, HashMap<String, TableDefinition>>,
    // 探測回報不存在，但建立時已被其他執行者搶先
    racing_creates: bool,
    create_database_calls: usize,
    create_table_calls: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_database(self, database: &str) -> Self {
        self.state
            .lock()
            .await
            .databases
            .insert(database.to_string(), HashMap::new());
        self
    }

    /// Probes always report absent while every create reports that another
    /// writer got there first.
    pub async fn with_racing_creates(self) -> Self {
        self.state.lock().await.racing_creates = true;
        self
    }

    pub async fn table(&self, database: &str, table: &str) -> Option<TableDefinition> {
        let state = self.state.lock().await;
        state
            .databases
            .get(database)
            .and_then(|tables| tables.get(table))
            .cloned()
    }

    pub async fn has_database(&self, database: &str) -> bool {
        self.state.lock().await.databases.contains_key(database)
    }

    pub async fn create_database_calls(&self) -> usize {
        self.state.lock().await.create_database_calls
    }

    pub async fn create_table_calls(&self) -> usize {
        self.state.lock().await.create_table_calls
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn database_exists(&self, database: &str) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(!state.racing_creates && state.databases.contains_key(database))
    }

    async fn create_database(&self, database: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.create_database_calls += 1;

        if state.racing_creates {
            state
                .databases
                .entry(database.to_string())
                .or_default();
            return Ok(false);
        }
        if state.databases.contains_key(database) {
            return Ok(false);
        }
        state.databases.insert(database.to_string(), HashMap::new());
        Ok(true)
    }

    async fn table_exists(&self, database: &str, table: &str) -> Result<bool> {
        let state = self.state.lock().await;
        if state.racing_creates {
            return Ok(false);
        }
        Ok(state
            .databases
            .get(database)
            .map(|tables| tables.contains_key(table))
            .unwrap_or(false))
    }

    async fn create_table(&self, database: &str, table: &TableDefinition) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.create_table_calls += 1;

        if state.racing_creates {
            state
                .databases
                .entry(database.to_string())
                .or_default()
                .entry(table.name.clone())
                .or_insert_with(|| table.clone());
            return Ok(false);
        }

        let tables = state.databases.get_mut(database).ok_or_else(|| {
            LakeError::catalog(
                "CreateTable",
                format!("EntityNotFoundException: Database {} not found", database),
            )
        })?;

        if tables.contains_key(&table.name) {
            return Ok(false);
        }
        tables.insert(table.name.clone(), table.clone());
        Ok(true)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryQueryEngine {
    submitted: Arc<Mutex<Vec<QueryRequest>>>,
}

impl InMemoryQueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submitted(&self) -> Vec<QueryRequest> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl QueryEngine for InMemoryQueryEngine {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle> {
        let mut submitted = self.submitted.lock().await;
        submitted.push(request.clone());
        Ok(QueryHandle {
            execution_id: format!("query-{}", submitted.len()),
        })
    }
}
