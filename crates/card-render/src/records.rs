//! Record import from CSV and JSON files.
//!
//! Records are opaque key-value maps; import only normalizes values and
//! guarantees every record a stable id, synthesized from the row position
//! when the source has none.

use std::path::Path;

use crate::model::{Record, Value};
use crate::types::{RenderError, Result};

/// Load records, dispatching on the file extension (`.csv` or `.json`).
pub async fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => load_records_csv(path).await,
        "json" => load_records_json(path).await,
        other => Err(RenderError::Config(format!(
            "unsupported records format {other:?} (expected csv or json)"
        ))),
    }
}

/// Load records from a CSV file; the header row supplies the keys.
pub async fn load_records_csv(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;

    let records = tokio::task::spawn_blocking(move || {
        let mut reader = csv::Reader::from_reader(contents.as_bytes());
        let headers = reader.headers()?.clone();
        let mut records = Vec::new();

        for (index, row) in reader.records().enumerate() {
            let row = row?;
            let mut record = Record::new(String::new());
            for (key, value) in headers.iter().zip(row.iter()) {
                if key == "id" {
                    record.id = value.to_string();
                } else {
                    record.insert(key, Value::Text(value.to_string()));
                }
            }
            if record.id.is_empty() {
                record.id = format!("row-{}", index + 1);
            }
            records.push(record);
        }
        Ok::<_, RenderError>(records)
    })
    .await??;

    Ok(records)
}

/// Load records from a JSON array of flat objects.
pub async fn load_records_json(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;

    let records = tokio::task::spawn_blocking(move || {
        let rows: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(&contents)?;

        let mut records = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            let mut record = Record::new(String::new());
            for (key, value) in row {
                if key == "id" {
                    record.id = json_scalar(&value).map(|v| v.display()).unwrap_or_default();
                    continue;
                }
                match json_scalar(&value) {
                    Some(v) => record.insert(key, v),
                    None => log::debug!("record {}: skipping non-scalar key {key:?}", index + 1),
                }
            }
            if record.id.is_empty() {
                record.id = format!("row-{}", index + 1);
            }
            records.push(record);
        }
        Ok::<_, RenderError>(records)
    })
    .await??;

    Ok(records)
}

fn json_scalar(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
        serde_json::Value::Bool(b) => Some(Value::Text(b.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn csv_headers_become_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "staff.csv",
            "id,name,employeeId\nE-1,Ada Lovelace,1001\nE-2,Grace Hopper,1002\n",
        )
        .await;

        let records = load_records(&path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "E-1");
        assert_eq!(records[0].text("name").as_deref(), Some("Ada Lovelace"));
        assert_eq!(records[1].text("employeeId").as_deref(), Some("1002"));
        // "id" is the identifier, not a lookup key.
        assert!(records[0].get("id").is_none());
    }

    #[tokio::test]
    async fn csv_without_id_synthesizes_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "staff.csv", "name\nAda\nGrace\n").await;

        let records = load_records_csv(&path).await.unwrap();
        assert_eq!(records[0].id, "row-1");
        assert_eq!(records[1].id, "row-2");
    }

    #[tokio::test]
    async fn json_numbers_survive_as_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "staff.json",
            r#"[{"id": 7, "name": "Ada", "badge": 42, "tags": ["x"]}]"#,
        )
        .await;

        let records = load_records(&path).await.unwrap();
        assert_eq!(records[0].id, "7");
        assert_eq!(records[0].get("badge"), Some(&Value::Number(42.0)));
        assert_eq!(records[0].text("badge").as_deref(), Some("42"));
        // Arrays are not scalar card content.
        assert!(records[0].get("tags").is_none());
    }

    #[tokio::test]
    async fn unknown_extension_is_a_config_error() {
        let err = load_records("staff.xlsx").await.unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }
}
