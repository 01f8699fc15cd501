use crate::core::ndjson;
use crate::domain::model::RecordBatch;
use crate::domain::ports::ObjectStore;
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum UploadOutcome {
    Skipped,
    Written { records: usize, bytes: i64 },
}

/// Writes the whole batch as one newline-delimited JSON object.
///
/// An empty batch is not an error; no write is issued for it.
pub async fn upload<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    key: &str,
    batch: &RecordBatch,
) -> Result<UploadOutcome> {
    if batch.is_empty() {
        tracing::info!("No records fetched, skipping upload");
        return Ok(UploadOutcome::Skipped);
    }

    let payload = ndjson::encode(batch)?.into_bytes();
    let content_length = payload.len() as i64;

    tracing::debug!(
        "Writing {} records ({} bytes) to s3://{}/{}",
        batch.len(),
        content_length,
        bucket,
        key
    );
    store.put_object(bucket, key, payload, content_length).await?;

    tracing::info!("Uploaded {} records to s3://{}/{}", batch.len(), bucket, key);
    Ok(UploadOutcome::Written {
        records: batch.len(),
        bytes: content_length,
    })
}
