use crate::domain::model::Record;
use crate::utils::error::Result;

/// 每筆資料獨立序列化成一行 JSON，每行結尾都有 `\n`
pub fn encode<'a, I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut payload = String::new();
    for record in records {
        payload.push_str(&serde_json::to_string(record)?);
        payload.push('\n');
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RecordBatch;
    use serde_json::{json, Value};

    #[test]
    fn test_one_line_per_record_in_order() {
        let batch = RecordBatch::from_json(json!([
            {"id": "1", "name": "A", "stats": {"pts": 10, "reb": [1, 2]}},
            {"id": "2", "name": "B"},
            {"id": "3", "name": "C\nwith newline"}
        ]))
        .unwrap();

        let payload = encode(&batch).unwrap();
        let lines: Vec<&str> = payload.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(payload.ends_with('\n'));

        for (line, record) in lines.iter().zip(batch.iter()) {
            let parsed: Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed, Value::Object(record.data.clone()));
        }
    }

    #[test]
    fn test_records_are_not_wrapped() {
        let batch = RecordBatch::from_json(json!({"id": "1", "name": "A"})).unwrap();
        assert_eq!(encode(&batch).unwrap(), "{\"id\":\"1\",\"name\":\"A\"}\n");
    }

    #[test]
    fn test_empty_batch_encodes_to_empty_string() {
        let batch = RecordBatch::default();
        assert_eq!(encode(&batch).unwrap(), "");
    }
}
