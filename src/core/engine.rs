use crate::config::LakeConfig;
use crate::core::fetcher::DataFetcher;
use crate::core::uploader::UploadOutcome;
use crate::core::{catalog, query, storage, uploader};
use crate::domain::model::{Provisioned, TableDefinition};
use crate::domain::ports::{Catalog, ObjectStore, QueryEngine};
use crate::utils::error::{Result, Stage};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What one successful run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub bucket: Provisioned,
    pub database: Provisioned,
    pub records_fetched: usize,
    pub upload: UploadOutcome,
    pub table: Provisioned,
    pub query_execution_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct LakeEngine<S: ObjectStore, C: Catalog, Q: QueryEngine> {
    config: LakeConfig,
    store: S,
    catalog: C,
    query_engine: Q,
    fetcher: DataFetcher,
}

impl<S: ObjectStore, C: Catalog, Q: QueryEngine> LakeEngine<S, C, Q> {
    pub fn new(config: LakeConfig, store: S, catalog: C, query_engine: Q) -> Result<Self> {
        let fetcher = match config.request_timeout {
            Some(timeout) => DataFetcher::with_timeout(timeout)?,
            None => DataFetcher::new(),
        };

        Ok(Self {
            config,
            store,
            catalog,
            query_engine,
            fetcher,
        })
    }

    /// Runs every step in order and stops at the first failure.
    ///
    /// Resources created before the failing step are left in place.
    pub async fn run(&self) -> Result<RunSummary> {
        let config = &self.config;
        let started_at = Utc::now();
        tracing::info!("Starting data lake setup in {}", config.region);

        // 1. Bucket
        let bucket = storage::ensure_bucket(&self.store, &config.bucket)
            .await
            .map_err(|e| e.at_stage(Stage::CreateBucket))?;

        // 2. 等待 bucket 可見，取代固定的等待時間
        storage::wait_for_bucket(
            &self.store,
            &config.bucket,
            config.readiness_timeout,
            config.readiness_interval,
        )
        .await
        .map_err(|e| e.at_stage(Stage::AwaitBucket))?;

        // 3. Glue database
        let database = catalog::ensure_database(&self.catalog, &config.database)
            .await
            .map_err(|e| e.at_stage(Stage::CreateDatabase))?;

        // 4. Fetch
        let batch = self
            .fetcher
            .fetch(&config.endpoint, &config.api_key)
            .await
            .map_err(|e| e.at_stage(Stage::FetchData))?;

        // 5. Upload, 空資料直接跳過
        let upload = uploader::upload(&self.store, &config.bucket, &config.object_key, &batch)
            .await
            .map_err(|e| e.at_stage(Stage::UploadData))?;

        // 6. Glue table
        let definition = TableDefinition::stats_table(&config.table, &config.table_location());
        let table = catalog::ensure_table(&self.catalog, &config.database, &definition)
            .await
            .map_err(|e| e.at_stage(Stage::CreateTable))?;

        // 7. Athena
        let handle = query::configure(
            &self.query_engine,
            &config.database,
            &config.results_location(),
        )
        .await
        .map_err(|e| e.at_stage(Stage::ConfigureQueryEngine))?;

        tracing::info!("Data lake setup complete.");

        Ok(RunSummary {
            bucket,
            database,
            records_fetched: batch.len(),
            upload,
            table,
            query_execution_id: handle.execution_id,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryCatalog, InMemoryObjectStore, InMemoryQueryEngine};
    use crate::config::{LakeSettings, API_KEY_VAR, ENDPOINT_VAR};
    use httpmock::prelude::*;

    fn test_config(endpoint: String) -> LakeConfig {
        LakeConfig::from_lookup(
            |name| match name {
                API_KEY_VAR => Some("test-key".to_string()),
                ENDPOINT_VAR => Some(endpoint.clone()),
                _ => None,
            },
            LakeSettings {
                readiness_timeout_secs: Some(2),
                readiness_interval_ms: Some(5),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_stops_after_failing_stage() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/nba");
            then.status(500).body("upstream down");
        });

        let store = InMemoryObjectStore::new();
        let catalog = InMemoryCatalog::new();
        let query_engine = InMemoryQueryEngine::new();
        let engine = LakeEngine::new(
            test_config(server.url("/nba")),
            store.clone(),
            catalog.clone(),
            query_engine.clone(),
        )
        .unwrap();

        let err = engine.run().await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::FetchData));
        assert_eq!(
            err.to_string(),
            "Failed to fetch NBA data: API returned 500: upstream down"
        );
        // 前面建立的資源保留，後面的步驟沒有執行
        assert_eq!(store.create_calls().await, 1);
        assert!(catalog.has_database("glue_nba_data_lake").await);
        assert_eq!(store.put_calls().await, 0);
        assert_eq!(catalog.create_table_calls().await, 0);
        assert!(query_engine.submitted().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_fails_when_bucket_never_appears() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/nba");
            then.status(200).json_body(serde_json::json!([]));
        });

        let store = InMemoryObjectStore::new().with_visibility_lag(10_000).await;
        let mut config = test_config(server.url("/nba"));
        config.readiness_timeout = std::time::Duration::from_millis(40);
        config.readiness_interval = std::time::Duration::from_millis(10);

        let engine = LakeEngine::new(
            config,
            store,
            InMemoryCatalog::new(),
            InMemoryQueryEngine::new(),
        )
        .unwrap();

        let err = engine.run().await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::AwaitBucket));
        api_mock.assert_hits(0);
    }
}
