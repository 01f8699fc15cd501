use crate::domain::model::RecordBatch;
use crate::utils::error::{LakeError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// One authenticated GET against the sports data API.
#[derive(Debug, Clone)]
pub struct DataFetcher {
    client: Client,
}

impl DataFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, endpoint: &str, api_key: &str) -> Result<RecordBatch> {
        tracing::debug!("Making API request to: {}", endpoint);
        let response = self
            .client
            .get(endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, api_key)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        // 只接受 200，其他 2xx 也視為狀態錯誤
        if status != StatusCode::OK {
            // 讀取失敗時以空字串代替，保留原本的狀態碼錯誤
            let body = response.text().await.unwrap_or_default();
            return Err(LakeError::HttpStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let payload: serde_json::Value = serde_json::from_slice(&bytes)?;
        let batch = RecordBatch::from_json(payload)?;

        tracing::info!("Fetched {} records from the data API", batch.len());
        Ok(batch)
    }
}

impl Default for DataFetcher {
    fn default() -> Self {
        Self::new()
    }
}
