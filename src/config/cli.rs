use crate::config::LakeSettings;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "sports-lake")]
#[command(about = "Provision an S3/Glue/Athena data lake and load NBA data into it")]
pub struct CliArgs {
    #[arg(long, help = "TOML file with non-secret settings")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = ".env", help = "dotenv file to load before reading the environment")]
    pub env_file: PathBuf,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub bucket: Option<String>,

    #[arg(long)]
    pub database: Option<String>,

    #[arg(long)]
    pub table: Option<String>,

    #[arg(long)]
    pub object_key: Option<String>,

    #[arg(long, help = "Prefix under the bucket for Athena query results")]
    pub results_prefix: Option<String>,

    #[arg(long, help = "Seconds to wait for a new bucket to become reachable")]
    pub ready_timeout_secs: Option<u64>,

    #[arg(long, help = "Milliseconds between bucket readiness checks")]
    pub readiness_interval_ms: Option<u64>,

    #[arg(long, help = "Timeout for the data API request")]
    pub request_timeout_secs: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliArgs {
    /// 命令列上明確給的值
    pub fn settings(&self) -> LakeSettings {
        LakeSettings {
            region: self.region.clone(),
            bucket: self.bucket.clone(),
            database: self.database.clone(),
            table: self.table.clone(),
            object_key: self.object_key.clone(),
            results_prefix: self.results_prefix.clone(),
            readiness_timeout_secs: self.ready_timeout_secs,
            readiness_interval_ms: self.readiness_interval_ms,
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}
