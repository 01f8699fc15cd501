use crate::domain::model::{BucketProbe, QueryHandle, QueryRequest, TableDefinition};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 物件儲存服務 (S3) 中本程式用到的操作
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `NotFound` is a normal answer; any other failure is an error.
    async fn probe_bucket(&self, bucket: &str) -> Result<BucketProbe>;
    async fn create_bucket(&self, bucket: &str) -> Result<()>;
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_length: i64,
    ) -> Result<()>;
}

/// 中繼資料目錄 (Glue)
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn database_exists(&self, database: &str) -> Result<bool>;
    /// Returns `false` when the database already existed at create time.
    async fn create_database(&self, database: &str) -> Result<bool>;
    async fn table_exists(&self, database: &str, table: &str) -> Result<bool>;
    /// Returns `false` when the table already existed at create time.
    async fn create_table(&self, database: &str, table: &TableDefinition) -> Result<bool>;
}

/// 查詢引擎 (Athena)
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle>;
}
