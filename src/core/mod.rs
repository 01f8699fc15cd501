pub mod catalog;
pub mod engine;
pub mod fetcher;
pub mod ndjson;
pub mod query;
pub mod storage;
pub mod uploader;

pub use crate::domain::model::{Record, RecordBatch};
pub use crate::domain::ports::{Catalog, ObjectStore, QueryEngine};
pub use crate::utils::error::Result;
