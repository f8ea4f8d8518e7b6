//! Entity loading utilities
//!
//! Each collection is persisted as one JSON object mapping primary keys to
//! records. The mapping key is authoritative for the primary key: any `pk`
//! field inside the record is overwritten on load.

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::core::entity::Entity;
use crate::core::storage::StorageError;
use crate::json::parse_json_file;

/// Load all records of type T from a collection file
///
/// A missing file is an empty collection. A file that is not valid JSON, or
/// a record that does not match T, is an error.
pub fn load_collection<T: Entity>(path: &Path) -> Result<Vec<T>, StorageError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "collection file missing, treating as empty");
        return Ok(Vec::new());
    }

    let records: Map<String, Value> = parse_json_file(path)?;
    let mut entities = Vec::with_capacity(records.len());

    for (pk, value) in records {
        let mut entity: T = serde_json::from_value(value).map_err(|e| StorageError::Record {
            file: path.display().to_string(),
            pk: pk.clone(),
            message: e.to_string(),
        })?;
        entity.set_pk(pk);
        entities.push(entity);
    }

    Ok(entities)
}

/// Write records to a collection file as pretty-printed JSON
pub fn save_collection<'a, T, I>(path: &Path, entities: I) -> Result<(), StorageError>
where
    T: Entity + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut records = Map::new();
    for entity in entities {
        records.insert(entity.pk().to_string(), serde_json::to_value(entity)?);
    }

    let mut content = serde_json::to_string_pretty(&Value::Object(records))?;
    content.push('\n');

    fs::write(path, content).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Resource, Step};
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let result: Vec<Resource> =
            load_collection(Path::new("/nonexistent/path/tools.json")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_load_assigns_pk_from_mapping_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tools.json");
        fs::write(
            &path,
            r#"{"12": {"pk": "stale", "key": "DS-TOL-0012", "name": "Hex key"},
               "13": {"key": "DS-TOL-0013", "name": "Caliper"}}"#,
        )
        .unwrap();

        let tools: Vec<Resource> = load_collection(&path).unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].pk, "12");
        assert_eq!(tools[0].key, "DS-TOL-0012");
        assert_eq!(tools[1].pk, "13");
    }

    #[test]
    fn test_load_invalid_json_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("steps.json");
        fs::write(&path, "{\"S1\": {\"key\": \"S1\",}}").unwrap();

        let result: Result<Vec<Step>, _> = load_collection(&path);
        assert!(matches!(result, Err(StorageError::Json(_))));
    }

    #[test]
    fn test_load_mismatched_record_names_pk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("steps.json");
        fs::write(&path, r#"{"S1": {"key": "S1", "inputparts": "not a map"}}"#).unwrap();

        let err = load_collection::<Step>(&path).unwrap_err();
        match err {
            StorageError::Record { pk, .. } => assert_eq!(pk, "S1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("steps.json");

        let mut step = Step::new("STEP-1", "Cut");
        step.add_outputpart("P1", 2.0);
        step.add_start_after("STEP-0", serde_json::json!({"note": "dry first"}));
        save_collection(&path, [&step]).unwrap();

        let loaded: Vec<Step> = load_collection(&path).unwrap();
        assert_eq!(loaded, vec![step]);
    }
}
