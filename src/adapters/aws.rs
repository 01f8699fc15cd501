use crate::config::LakeConfig;
use crate::domain::model::{BucketProbe, QueryHandle, QueryRequest, TableDefinition};
use crate::domain::ports::{Catalog, ObjectStore, QueryEngine};
use crate::utils::error::{LakeError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_athena::types::{QueryExecutionContext, ResultConfiguration};
use aws_sdk_athena::Client as AthenaClient;
use aws_sdk_glue::operation::create_database::CreateDatabaseError;
use aws_sdk_glue::operation::create_table::CreateTableError;
use aws_sdk_glue::operation::get_database::GetDatabaseError;
use aws_sdk_glue::operation::get_table::GetTableError;
use aws_sdk_glue::types::{Column, DatabaseInput, SerDeInfo, StorageDescriptor, TableInput};
use aws_sdk_glue::Client as GlueClient;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client as S3Client;

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// us-east-1 是唯一不接受 LocationConstraint 的區域
const DEFAULT_S3_REGION: &str = "us-east-1";

fn describe<E: std::error::Error>(err: &E) -> String {
    DisplayErrorContext(err).to_string()
}

/// `Ok(())` when `err` is the service error `expected` picks out, otherwise
/// the rendered error.
fn tolerate<E, R>(err: SdkError<E, R>, expected: impl Fn(&E) -> bool) -> std::result::Result<(), String>
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if err.as_service_error().map(expected).unwrap_or(false) {
        Ok(())
    } else {
        Err(describe(&err))
    }
}

fn head_bucket_failure<R: std::fmt::Debug>(err: SdkError<HeadBucketError, R>) -> Result<BucketProbe> {
    tolerate(err, HeadBucketError::is_not_found)
        .map(|()| BucketProbe::NotFound)
        .map_err(|message| LakeError::storage("HeadBucket", message))
}

/// `Ok(false)` for the tolerated service error: a lookup that found nothing,
/// or a create that lost a race to another writer.
fn catalog_failure<E, R>(
    operation: &str,
    err: SdkError<E, R>,
    tolerated: impl Fn(&E) -> bool,
) -> Result<bool>
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    tolerate(err, tolerated)
        .map(|()| false)
        .map_err(|message| LakeError::catalog(operation, message))
}

fn bucket_configuration(region: &str) -> Option<CreateBucketConfiguration> {
    if region == DEFAULT_S3_REGION {
        return None;
    }
    Some(
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build(),
    )
}

/// Content type and length for an upload; the length must describe `body`.
fn upload_headers(body: &[u8], content_length: i64) -> Result<(&'static str, i64)> {
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
    Ok((NDJSON_CONTENT_TYPE, content_length))
}

fn table_input(table: &TableDefinition) -> Result<TableInput> {
    let columns = table
        .columns
        .iter()
        .map(|c| {
            Column::builder()
                .name(&c.name)
                .r#type(&c.data_type)
                .build()
                .map_err(|e| LakeError::catalog("CreateTable", e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let storage = StorageDescriptor::builder()
        .set_columns(Some(columns))
        .location(&table.location)
        .input_format(&table.input_format)
        .output_format(&table.output_format)
        .serde_info(
            SerDeInfo::builder()
                .serialization_library(&table.serde_library)
                .build(),
        )
        .build();

    TableInput::builder()
        .name(&table.name)
        .table_type(&table.table_type)
        .storage_descriptor(storage)
        .build()
        .map_err(|e| LakeError::catalog("CreateTable", e.to_string()))
}

/// The three service clients, built from the shared AWS config chain.
#[derive(Debug, Clone)]
pub struct AwsServices {
    pub store: S3ObjectStore,
    pub catalog: GlueCatalog,
    pub query_engine: AthenaQueryEngine,
}

impl AwsServices {
    pub async fn from_config(config: &LakeConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        tracing::debug!("Loaded AWS configuration for region {}", config.region);

        Self {
            store: S3ObjectStore::new(S3Client::new(&sdk_config), config.region.clone()),
            catalog: GlueCatalog::new(GlueClient::new(&sdk_config)),
            query_engine: AthenaQueryEngine::new(AthenaClient::new(&sdk_config)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    region: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, region: String) -> Self {
        Self { client, region }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn probe_bucket(&self, bucket: &str) -> Result<BucketProbe> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(BucketProbe::Exists),
            Err(err) => head_bucket_failure(err),
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(bucket_configuration(&self.region))
            .send()
            .await
            .map_err(|e| LakeError::storage("CreateBucket", describe(&e)))?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_length: i64,
    ) -> Result<()> {
        let (content_type, content_length) = upload_headers(&body, content_length)?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .content_length(content_length)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| LakeError::storage("PutObject", describe(&e)))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GlueCatalog {
    client: GlueClient,
}

impl GlueCatalog {
    pub fn new(client: GlueClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Catalog for GlueCatalog {
    async fn database_exists(&self, database: &str) -> Result<bool> {
        match self.client.get_database().name(database).send().await {
            Ok(_) => Ok(true),
            Err(err) => catalog_failure(
                "GetDatabase",
                err,
                GetDatabaseError::is_entity_not_found_exception,
            ),
        }
    }

    async fn create_database(&self, database: &str) -> Result<bool> {
        let input = DatabaseInput::builder()
            .name(database)
            .build()
            .map_err(|e| LakeError::catalog("CreateDatabase", e.to_string()))?;

        match self
            .client
            .create_database()
            .database_input(input)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => catalog_failure(
                "CreateDatabase",
                err,
                CreateDatabaseError::is_already_exists_exception,
            ),
        }
    }

    async fn table_exists(&self, database: &str, table: &str) -> Result<bool> {
        match self
            .client
            .get_table()
            .database_name(database)
            .name(table)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => catalog_failure("GetTable", err, GetTableError::is_entity_not_found_exception),
        }
    }

    async fn create_table(&self, database: &str, table: &TableDefinition) -> Result<bool> {
        let input = table_input(table)?;

        match self
            .client
            .create_table()
            .database_name(database)
            .table_input(input)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => catalog_failure(
                "CreateTable",
                err,
                CreateTableError::is_already_exists_exception,
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AthenaQueryEngine {
    client: AthenaClient,
}

impl AthenaQueryEngine {
    pub fn new(client: AthenaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryEngine for AthenaQueryEngine {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle> {
        let output = self
            .client
            .start_query_execution()
            .query_string(&request.statement)
            .query_execution_context(
                QueryExecutionContext::builder()
                    .database(&request.database)
                    .build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(&request.output_location)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| LakeError::QueryError {
                message: describe(&e),
            })?;

        let execution_id = output
            .query_execution_id()
            .ok_or_else(|| LakeError::QueryError {
                message: "StartQueryExecution returned no execution id".to_string(),
            })?
            .to_string();

        Ok(QueryHandle { execution_id })
    }
}
