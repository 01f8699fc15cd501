use crate::config::LakeSettings;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 非機密設定的 TOML 檔案；金鑰與端點只從環境變數讀取
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub aws: Option<AwsSection>,
    pub lake: Option<LakeSection>,
    pub readiness: Option<ReadinessSection>,
    pub source: Option<SourceSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsSection {
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LakeSection {
    pub bucket: Option<String>,
    pub database: Option<String>,
    pub table: Option<String>,
    pub object_key: Option<String>,
    pub results_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadinessSection {
    pub timeout_secs: Option<u64>,
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    pub request_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn into_settings(self) -> LakeSettings {
        let aws = self.aws.unwrap_or_default();
        let lake = self.lake.unwrap_or_default();
        let readiness = self.readiness.unwrap_or_default();
        let source = self.source.unwrap_or_default();

        LakeSettings {
            region: aws.region,
            bucket: lake.bucket,
            database: lake.database,
            table: lake.table,
            object_key: lake.object_key,
            results_prefix: lake.results_prefix,
            readiness_timeout_secs: readiness.timeout_secs,
            readiness_interval_ms: readiness.interval_ms,
            request_timeout_secs: source.request_timeout_secs,
        }
    }
}
