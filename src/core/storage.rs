use crate::domain::model::{BucketProbe, Provisioned};
use crate::domain::ports::ObjectStore;
use crate::utils::error::{LakeError, Result};
use std::time::Duration;
use tokio::time::Instant;

/// Probes `bucket` and creates it only when the probe says it is missing.
///
/// Any probe failure other than "not found" is returned unchanged. Nothing
/// is rolled back if a later step fails.
pub async fn ensure_bucket<S: ObjectStore + ?Sized>(store: &S, bucket: &str) -> Result<Provisioned> {
    match store.probe_bucket(bucket).await? {
        BucketProbe::Exists => {
            tracing::info!("Bucket {} already exists", bucket);
            Ok(Provisioned::AlreadyExisted)
        }
        BucketProbe::NotFound => {
            store.create_bucket(bucket).await?;
            tracing::info!("Bucket {} created successfully", bucket);
            Ok(Provisioned::Created)
        }
    }
}

/// Polls until the bucket is visible or `timeout` has elapsed.
pub async fn wait_for_bucket<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<Duration> {
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if store.probe_bucket(bucket).await? == BucketProbe::Exists {
            let waited = started.elapsed();
            tracing::debug!(
                "Bucket {} reachable after {} probe(s), {:?}",
                bucket,
                attempts,
                waited
            );
            return Ok(waited);
        }

        let waited = started.elapsed();
        if waited + interval > timeout {
            return Err(LakeError::ReadinessTimeout {
                bucket: bucket.to_string(),
                waited,
            });
        }

        tracing::debug!("Bucket {} not visible yet, retrying in {:?}", bucket, interval);
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryObjectStore;

    const BUCKET: &str = "sports-analytics-data-lake3";

    #[tokio::test]
    async fn test_ensure_bucket_creates_missing_bucket() {
        let store = InMemoryObjectStore::new();

        let outcome = ensure_bucket(&store, BUCKET).await.unwrap();

        assert_eq!(outcome, Provisioned::Created);
        assert_eq!(store.create_calls().await, 1);
        assert_eq!(store.bucket_names().await, vec![BUCKET.to_string()]);
    }

    #[tokio::test]
    async fn test_ensure_bucket_is_idempotent() {
        let store = InMemoryObjectStore::new();

        let first = ensure_bucket(&store, BUCKET).await.unwrap();
        let second = ensure_bucket(&store, BUCKET).await.unwrap();

        assert_eq!(first, Provisioned::Created);
        assert_eq!(second, Provisioned::AlreadyExisted);
        assert_eq!(store.create_calls().await, 1);
        assert_eq!(store.bucket_names().await.len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_bucket_propagates_other_probe_errors() {
        let store = InMemoryObjectStore::new()
            .failing_probes("403 Forbidden")
            .await;

        let err = ensure_bucket(&store, BUCKET).await.unwrap_err();

        assert!(matches!(err, LakeError::StorageError { .. }));
        assert!(err.to_string().contains("403 Forbidden"));
        assert_eq!(store.create_calls().await, 0);
    }

    #[tokio::test]
    async fn test_wait_for_bucket_polls_until_visible() {
        let store = InMemoryObjectStore::new().with_visibility_lag(3).await;
        ensure_bucket(&store, BUCKET).await.unwrap();
        let probes_before = store.probe_calls().await;

        wait_for_bucket(
            &store,
            BUCKET,
            Duration::from_secs(5),
            Duration::from_millis(5),
        )
        .await
        .unwrap();

        // 3 次 NotFound 之後第 4 次成功
        assert_eq!(store.probe_calls().await - probes_before, 4);
    }

    #[tokio::test]
    async fn test_wait_for_bucket_times_out() {
        let store = InMemoryObjectStore::new();

        let err = wait_for_bucket(
            &store,
            "never-created",
            Duration::from_millis(30),
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, LakeError::ReadinessTimeout { ref bucket, .. } if bucket == "never-created"));
    }
}
