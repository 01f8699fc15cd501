pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliArgs;
pub use crate::config::{LakeConfig, LakeSettings};

#[cfg(feature = "aws")]
pub use crate::adapters::aws::AwsServices;

pub use crate::core::engine::{LakeEngine, RunSummary};
pub use crate::utils::error::{LakeError, Result, Stage};
