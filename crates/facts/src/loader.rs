//! Fact file loader: read, parse, shape-check, emit.

use std::fs;
use std::path::Path;

use crate::document::ParsedDocument;
use crate::error::Result;
use crate::sink::RecordSink;

/// Load a fact file and hand its records to `sink` in document order.
///
/// The whole file is validated before the first record is emitted, so a
/// rejected shape never produces a partial enqueue. I/O and YAML syntax errors
/// propagate unchanged. Returns the number of records emitted.
pub fn load<S: RecordSink + ?Sized>(path: &Path, sink: &S) -> Result<usize> {
    let contents = fs::read_to_string(path)?;
    load_str(&contents, sink).map_err(|e| e.with_path(path))
}

/// Same as [`load`] for in-memory YAML text.
pub fn load_str<S: RecordSink + ?Sized>(text: &str, sink: &S) -> Result<usize> {
    let records = ParsedDocument::parse(text)?.into_records()?;
    let count = records.len();
    for record in records {
        sink.put(record)?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use serde_yaml::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::document::Record;
    use crate::error::FactError;

    fn write_fact(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write fact file");
        path
    }

    fn collector() -> Mutex<Vec<Record>> {
        Mutex::new(Vec::new())
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records
            .iter()
            .filter_map(|r| r.get("name").and_then(Value::as_str))
            .collect()
    }

    #[test]
    fn single_mapping_emits_one_record() {
        let dir = TempDir::new().unwrap();
        let path = write_fact(&dir, "facts.yml", "name: x\nlevel: 3\n");
        let sink = collector();

        let count = load(&path, &sink).unwrap();

        let records = sink.into_inner().unwrap();
        assert_eq!(count, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name"), Some(&Value::from("x")));
        assert_eq!(records[0].get("level"), Some(&Value::from(3)));
    }

    #[test]
    fn sequence_emits_one_record_per_element() {
        let dir = TempDir::new().unwrap();
        let path = write_fact(&dir, "facts.yml", "- name: a\n- name: b\n- name: c\n");
        let sink = collector();

        assert_eq!(load(&path, &sink).unwrap(), 3);
        assert_eq!(names(&sink.into_inner().unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_file_emits_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_fact(&dir, "facts.yml", "");
        let sink = collector();

        assert_eq!(load(&path, &sink).unwrap(), 0);
        assert!(sink.into_inner().unwrap().is_empty());
    }

    #[test]
    fn scalar_is_shape_error_naming_file() {
        let dir = TempDir::new().unwrap();
        let path = write_fact(&dir, "facts.yml", "hello\n");
        let sink = collector();

        let err = load(&path, &sink).unwrap_err();
        match &err {
            FactError::Shape { path: p, found } => {
                assert_eq!(p, &path);
                assert_eq!(found, "string");
            }
            other => panic!("expected shape error, got {other:?}"),
        }
        assert!(err.to_string().contains("facts.yml"));
        assert!(sink.into_inner().unwrap().is_empty());
    }

    #[test]
    fn mixed_sequence_emits_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_fact(&dir, "facts.yml", "- name: a\n- 7\n- name: c\n");
        let sink = collector();

        let err = load(&path, &sink).unwrap_err();
        assert!(matches!(err, FactError::Shape { .. }));
        assert!(err.to_string().contains("number at index 1"));
        assert!(sink.into_inner().unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let sink = collector();

        let err = load(&dir.path().join("absent.yml"), &sink).unwrap_err();
        assert!(matches!(err, FactError::Io(_)));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        let dir = TempDir::new().unwrap();
        let path = write_fact(&dir, "facts.yml", "name: [x\n");
        let sink = collector();

        assert!(matches!(load(&path, &sink), Err(FactError::Yaml(_))));
    }

    #[test]
    fn load_str_without_file() {
        let sink = collector();
        assert_eq!(load_str("{name: inline}", &sink).unwrap(), 1);
        assert_eq!(names(&sink.into_inner().unwrap()), vec!["inline"]);

        let err = load_str("3.5", &collector()).unwrap_err();
        assert!(err.to_string().contains("<text>"));
    }

    #[test]
    fn closed_queue_stops_emission() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Record>();
        drop(rx);
        let err = load_str("- name: a\n- name: b\n", &tx).unwrap_err();
        assert!(matches!(err, FactError::QueueClosed));
    }
}
