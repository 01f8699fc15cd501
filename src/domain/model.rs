use crate::utils::error::{LakeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 從 API 解碼出來的一筆資料，內容不做任何正規化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// 一次執行中抓到的全部資料，順序與 API 回傳相同
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    records: Vec<Record>,
}

impl RecordBatch {
    /// Decodes an API payload into a batch.
    ///
    /// An array becomes one record per element, a single object becomes a
    /// one-record batch. Any other top-level value, or an array element that
    /// is not an object, is rejected.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let mut records = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    match item {
                        Value::Object(obj) => records.push(Record::new(obj)),
                        other => {
                            return Err(LakeError::UnexpectedStructure {
                                found: format!(
                                    "array element {} is {}",
                                    index,
                                    json_kind(&other)
                                ),
                            })
                        }
                    }
                }
                Ok(Self { records })
            }
            Value::Object(obj) => Ok(Self {
                records: vec![Record::new(obj)],
            }),
            other => Err(LakeError::UnexpectedStructure {
                found: format!("top-level value is {}", json_kind(&other)),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RecordBatch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// 存在性探測的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketProbe {
    Exists,
    NotFound,
}

/// ensure_* 操作的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provisioned {
    Created,
    AlreadyExisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: String,
}

impl ColumnDefinition {
    pub fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: "string".to_string(),
        }
    }
}

pub const TEXT_INPUT_FORMAT: &str = "org.apache.hadoop.mapred.TextInputFormat";
pub const HIVE_TEXT_OUTPUT_FORMAT: &str =
    "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";
pub const JSON_SERDE: &str = "org.openx.data.jsonserde.JsonSerDe";

/// 目錄中的資料表定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub location: String,
    pub input_format: String,
    pub output_format: String,
    pub serde_library: String,
    pub table_type: String,
}

impl TableDefinition {
    /// The fixed `id`/`name`/`stats` schema, all strings, over `location`.
    ///
    /// Nested `stats` values are flattened to JSON text by the catalog at
    /// read time, not here.
    pub fn stats_table(name: &str, location: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: vec![
                ColumnDefinition::string("id"),
                ColumnDefinition::string("name"),
                ColumnDefinition::string("stats"),
            ],
            location: location.to_string(),
            input_format: TEXT_INPUT_FORMAT.to_string(),
            output_format: HIVE_TEXT_OUTPUT_FORMAT.to_string(),
            serde_library: JSON_SERDE.to_string(),
            table_type: "EXTERNAL_TABLE".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub database: String,
    pub statement: String,
    pub output_location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryHandle {
    pub execution_id: String,
}
