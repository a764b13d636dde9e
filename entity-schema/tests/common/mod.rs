//! Shared schema fixtures for the entity-schema integration tests

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SAMPLE_YAML: &str = r#"
notification:
  - { name: short_description, backend: shortDescription }
  - { name: start_date, backend: startDate, type: date }
  - { name: _status, backend: status }
"#;

pub const SAMPLE_JSON: &str = r#"{
    "notification": [
        {"name": "short_description", "backend": "shortDescription"},
        {"name": "start_date", "backend": "startDate", "type": "date"},
        {"name": "_status", "backend": "status"}
    ]
}"#;

/// Write `content` to `file_name` inside a fresh temp dir
pub fn write_schema_file(file_name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(file_name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    (temp_dir, path)
}
