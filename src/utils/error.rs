use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// 管道中的各個步驟，用於錯誤訊息與日誌
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateBucket,
    AwaitBucket,
    CreateDatabase,
    FetchData,
    UploadData,
    CreateTable,
    ConfigureQueryEngine,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::CreateBucket => "create S3 bucket",
            Stage::AwaitBucket => "wait for S3 bucket",
            Stage::CreateDatabase => "create Glue database",
            Stage::FetchData => "fetch NBA data",
            Stage::UploadData => "upload data to S3",
            Stage::CreateTable => "create Glue table",
            Stage::ConfigureQueryEngine => "configure Athena",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum LakeError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    HttpStatusError { status: u16, body: String },

    #[error("unexpected JSON structure: {found}")]
    UnexpectedStructure { found: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{field} is not set")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value:?}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("S3 {operation} failed: {message}")]
    StorageError { operation: String, message: String },

    #[error("Glue {operation} failed: {message}")]
    CatalogError { operation: String, message: String },

    #[error("Athena query submission failed: {message}")]
    QueryError { message: String },

    #[error("bucket {bucket} was not reachable after {waited:?}")]
    ReadinessTimeout { bucket: String, waited: Duration },

    #[error("Failed to {stage}: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<LakeError>,
    },
}

impl LakeError {
    pub fn storage(operation: &str, message: impl Into<String>) -> Self {
        LakeError::StorageError {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn catalog(operation: &str, message: impl Into<String>) -> Self {
        LakeError::CatalogError {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn at_stage(self, stage: Stage) -> Self {
        LakeError::StageFailed {
            stage,
            source: Box::new(self),
        }
    }

    /// 失敗的步驟；配置錯誤發生在任何步驟之前，所以回傳 None
    pub fn stage(&self) -> Option<Stage> {
        match self {
            LakeError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// 去掉 stage 包裝後的原始錯誤
    pub fn root(&self) -> &LakeError {
        match self {
            LakeError::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self.root(),
            LakeError::ConfigError { .. }
                | LakeError::MissingConfigError { .. }
                | LakeError::InvalidConfigValueError { .. }
                | LakeError::TomlError(_)
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            LakeError::MissingConfigError { .. } => {
                "Set SPORTS_DATA_API_KEY and NBA_ENDPOINT in the environment or in .env"
            }
            LakeError::ConfigError { .. }
            | LakeError::InvalidConfigValueError { .. }
            | LakeError::TomlError(_) => "Check the settings file and command line flags",
            LakeError::HttpStatusError { status: 401, .. }
            | LakeError::HttpStatusError { status: 403, .. } => {
                "Verify the subscription key for the data API"
            }
            LakeError::HttpStatusError { .. } | LakeError::ApiError(_) => {
                "Check that NBA_ENDPOINT is reachable and returns JSON"
            }
            LakeError::UnexpectedStructure { .. } | LakeError::SerializationError(_) => {
                "The data API returned a payload that is neither an object nor an array of objects"
            }
            LakeError::ReadinessTimeout { .. } => {
                "Raise --ready-timeout-secs or check the bucket in the S3 console"
            }
            LakeError::StorageError { .. }
            | LakeError::CatalogError { .. }
            | LakeError::QueryError { .. } => {
                "Check AWS credentials, region and IAM permissions"
            }
            LakeError::IoError(_) | LakeError::StageFailed { .. } => "Re-run with --verbose",
        }
    }
}

pub type Result<T> = std::result::Result<T, LakeError>;
