#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const API_KEY_VAR: &str = "SPORTS_DATA_API_KEY";
pub const ENDPOINT_VAR: &str = "NBA_ENDPOINT";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BUCKET: &str = "sports-analytics-data-lake3";
pub const DEFAULT_DATABASE: &str = "glue_nba_data_lake";
pub const DEFAULT_TABLE: &str = "nba_data";
pub const DEFAULT_OBJECT_KEY: &str = "nba_data.json";
pub const DEFAULT_RESULTS_PREFIX: &str = "athena-results/";
const DEFAULT_READINESS_TIMEOUT_SECS: u64 = 30;
const DEFAULT_READINESS_INTERVAL_MS: u64 = 1000;

/// 可覆寫的非機密設定；TOML 檔與命令列參數都會轉成這個結構
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LakeSettings {
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub database: Option<String>,
    pub table: Option<String>,
    pub object_key: Option<String>,
    pub results_prefix: Option<String>,
    pub readiness_timeout_secs: Option<u64>,
    pub readiness_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl LakeSettings {
    /// `overrides` wins field by field.
    pub fn merge(self, overrides: LakeSettings) -> LakeSettings {
        LakeSettings {
            region: overrides.region.or(self.region),
            bucket: overrides.bucket.or(self.bucket),
            database: overrides.database.or(self.database),
            table: overrides.table.or(self.table),
            object_key: overrides.object_key.or(self.object_key),
            results_prefix: overrides.results_prefix.or(self.results_prefix),
            readiness_timeout_secs: overrides
                .readiness_timeout_secs
                .or(self.readiness_timeout_secs),
            readiness_interval_ms: overrides
                .readiness_interval_ms
                .or(self.readiness_interval_ms),
            request_timeout_secs: overrides.request_timeout_secs.or(self.request_timeout_secs),
        }
    }
}

/// Everything one run needs, built once at startup and passed by reference.
#[derive(Clone)]
pub struct LakeConfig {
    pub api_key: String,
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub database: String,
    pub table: String,
    pub object_key: String,
    pub results_prefix: String,
    pub readiness_timeout: Duration,
    pub readiness_interval: Duration,
    pub request_timeout: Option<Duration>,
}

impl LakeConfig {
    /// 從行程環境變數讀取
    pub fn from_env(settings: LakeSettings) -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), settings)
    }

    /// Reads the two required values through `lookup` and fills the rest from
    /// `settings` or the built-in defaults.
    ///
    /// Fails on the first missing or empty variable, before anything touches
    /// the network.
    pub fn from_lookup<F>(lookup: F, settings: LakeSettings) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = validation::validate_required_field(API_KEY_VAR, lookup(API_KEY_VAR))?;
        let endpoint = validation::validate_required_field(ENDPOINT_VAR, lookup(ENDPOINT_VAR))?;

        Ok(Self {
            api_key,
            endpoint,
            region: settings.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bucket: settings.bucket.unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            database: settings
                .database
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            table: settings.table.unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            object_key: settings
                .object_key
                .unwrap_or_else(|| DEFAULT_OBJECT_KEY.to_string()),
            results_prefix: settings
                .results_prefix
                .unwrap_or_else(|| DEFAULT_RESULTS_PREFIX.to_string()),
            readiness_timeout: Duration::from_secs(
                settings
                    .readiness_timeout_secs
                    .unwrap_or(DEFAULT_READINESS_TIMEOUT_SECS),
            ),
            readiness_interval: Duration::from_millis(
                settings
                    .readiness_interval_ms
                    .unwrap_or(DEFAULT_READINESS_INTERVAL_MS),
            ),
            request_timeout: settings.request_timeout_secs.map(Duration::from_secs),
        })
    }

    /// 資料表指向整個 bucket 根目錄
    pub fn table_location(&self) -> String {
        format!("s3://{}/", self.bucket)
    }

    pub fn results_location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.results_prefix)
    }
}

impl fmt::Debug for LakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LakeConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("database", &self.database)
            .field("table", &self.table)
            .field("object_key", &self.object_key)
            .field("results_prefix", &self.results_prefix)
            .field("readiness_timeout", &self.readiness_timeout)
            .field("readiness_interval", &self.readiness_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Validate for LakeConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_aws_region("region", &self.region)?;
        validation::validate_s3_bucket_name("bucket", &self.bucket)?;
        validation::validate_non_empty_string("database", &self.database)?;
        validation::validate_non_empty_string("table", &self.table)?;
        validation::validate_non_empty_string("object_key", &self.object_key)?;

        validation::validate_range(
            "readiness_timeout_secs",
            self.readiness_timeout.as_secs(),
            1,
            600,
        )?;
        validation::validate_range(
            "readiness_interval_ms",
            self.readiness_interval.as_millis(),
            1,
            self.readiness_timeout.as_millis(),
        )?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LakeError;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = LakeConfig::from_lookup(
            lookup_from(&[(API_KEY_VAR, "secret"), (ENDPOINT_VAR, "http://api/nba")]),
            LakeSettings::default(),
        )
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.endpoint, "http://api/nba");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.bucket, "sports-analytics-data-lake3");
        assert_eq!(config.database, "glue_nba_data_lake");
        assert_eq!(config.object_key, "nba_data.json");
        assert_eq!(config.table_location(), "s3://sports-analytics-data-lake3/");
        assert_eq!(
            config.results_location(),
            "s3://sports-analytics-data-lake3/athena-results/"
        );
        assert!(config.request_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_names_variable() {
        let err = LakeConfig::from_lookup(
            lookup_from(&[(ENDPOINT_VAR, "http://api/nba")]),
            LakeSettings::default(),
        )
        .unwrap_err();

        assert!(matches!(&err, LakeError::MissingConfigError { field } if field == API_KEY_VAR));
        assert_eq!(err.to_string(), "SPORTS_DATA_API_KEY is not set");
    }

    #[test]
    fn test_empty_endpoint_is_missing() {
        let err = LakeConfig::from_lookup(
            lookup_from(&[(API_KEY_VAR, "secret"), (ENDPOINT_VAR, "")]),
            LakeSettings::default(),
        )
        .unwrap_err();

        assert!(matches!(&err, LakeError::MissingConfigError { field } if field == ENDPOINT_VAR));
    }

    #[test]
    fn test_endpoint_shape_is_not_checked() {
        let config = LakeConfig::from_lookup(
            lookup_from(&[(API_KEY_VAR, "k"), (ENDPOINT_VAR, "not a url")]),
            LakeSettings::default(),
        )
        .unwrap();
        assert_eq!(config.endpoint, "not a url");
    }

    #[test]
    fn test_settings_merge_prefers_overrides() {
        let file = LakeSettings {
            region: Some("eu-west-1".to_string()),
            bucket: Some("file-bucket".to_string()),
            ..Default::default()
        };
        let flags = LakeSettings {
            bucket: Some("flag-bucket".to_string()),
            ..Default::default()
        };

        let merged = file.merge(flags);
        assert_eq!(merged.region.as_deref(), Some("eu-west-1"));
        assert_eq!(merged.bucket.as_deref(), Some("flag-bucket"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = LakeConfig::from_lookup(
            lookup_from(&[(API_KEY_VAR, "super-secret"), (ENDPOINT_VAR, "http://x")]),
            LakeSettings::default(),
        )
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_validation_rejects_bad_bucket_and_interval() {
        let mut config = LakeConfig::from_lookup(
            lookup_from(&[(API_KEY_VAR, "k"), (ENDPOINT_VAR, "http://x")]),
            LakeSettings::default(),
        )
        .unwrap();

        config.bucket = "Bad_Bucket".to_string();
        assert!(config.validate().is_err());

        config.bucket = "good-bucket".to_string();
        config.readiness_interval = Duration::from_secs(60);
        assert!(config.validate().is_err());
    }
}
