//! Persistent storage of the record set.
//!
//! The core only ever needs two operations from storage: load everything, save
//! everything. [`PatientRepository`] is that boundary.
//!
//! ## File Layout
//!
//! [`JsonFileRepository`] keeps the whole record set in one JSON document keyed by id:
//!
//! ```text
//! {
//!   "P001": {
//!     "name": "Ananya Verma", "city": "Guwahati", "age": 28, "gender": "female",
//!     "height": 1.65, "weight": 90.0, "bmi": 33.06, "verdict": "obese"
//!   }
//! }
//! ```
//!
//! `bmi` and `verdict` are written for readers of the file but ignored on load; they
//! are recomputed from `height` and `weight`, so a hand-edited file cannot make them
//! stale. Key order is preserved across load and save.

use crate::constants::TEMP_FILE_SUFFIX;
use crate::error::{StorageError, StorageResult};
use crate::record::{Gender, PatientRecord, Verdict};
use crate::record_set::RecordSet;
use crate::validation::PatientDraft;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Whole-set access to persistent storage.
pub trait PatientRepository: Send + Sync {
    /// Read every stored record.
    fn load_all(&self) -> StorageResult<RecordSet>;

    /// Replace the stored record set with `records`.
    fn save_all(&self, records: &RecordSet) -> StorageResult<()>;
}

/// Record set stored as a single JSON document on disk.
#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(TEMP_FILE_SUFFIX);
        self.path.with_file_name(name)
    }
}

impl PatientRepository for JsonFileRepository {
    /// Parse the data file.
    ///
    /// A missing file is an empty record set, as is a file holding only whitespace.
    fn load_all(&self) -> StorageResult<RecordSet> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    "patient data file {} not found, starting empty",
                    self.path.display()
                );
                return Ok(RecordSet::new());
            }
            Err(source) => {
                return Err(StorageError::FileRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(RecordSet::new());
        }

        let records = parse_document(&contents)?;
        tracing::debug!(
            "loaded {} patient records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    /// Write the document next to the target and rename it into place, so a failed
    /// write leaves the previous document intact.
    fn save_all(&self, records: &RecordSet) -> StorageResult<()> {
        let raw = render_document(records)?;
        let temp_path = self.temp_path();

        if let Err(source) = fs::write(&temp_path, raw) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::FileWrite {
                path: temp_path,
                source,
            });
        }

        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::FileWrite {
                path: self.path.clone(),
                source,
            });
        }

        tracing::debug!(
            "saved {} patient records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Record set held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: Mutex<RecordSet>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: RecordSet) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl PatientRepository for InMemoryRepository {
    fn load_all(&self) -> StorageResult<RecordSet> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_all(&self, records: &RecordSet) -> StorageResult<()> {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records.clone();
        Ok(())
    }
}

// ============================================================================
// Document format (internal)
// ============================================================================

/// Stored entries in file order. Values are drafts: the id comes from the key.
struct StoredDocument(Vec<(String, PatientDraft)>);

impl<'de> Deserialize<'de> for StoredDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = StoredDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping patient ids to patient attributes")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, draft)) = access.next_entry::<String, PatientDraft>()? {
                    entries.push((id, draft));
                }
                Ok(StoredDocument(entries))
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Stored attributes plus the derived values, without the id (it is the key).
#[derive(Serialize)]
struct StoredPatient<'a> {
    name: &'a str,
    city: &'a str,
    age: u32,
    gender: Gender,
    height: f64,
    weight: f64,
    bmi: f64,
    verdict: Verdict,
}

impl<'a> From<&'a PatientRecord> for StoredPatient<'a> {
    fn from(record: &'a PatientRecord) -> Self {
        Self {
            name: record.name(),
            city: record.city(),
            age: record.age(),
            gender: record.gender(),
            height: record.height(),
            weight: record.weight(),
            bmi: record.bmi(),
            verdict: record.verdict(),
        }
    }
}

struct StoredDocumentRef<'a>(&'a RecordSet);

impl Serialize for StoredDocumentRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for record in self.0 {
            map.serialize_entry(record.id(), &StoredPatient::from(record))?;
        }
        map.end()
    }
}

/// Parse and validate a stored document.
///
/// Uses `serde_path_to_error` so a malformed entry is reported with its location
/// (for example `P001.age`).
fn parse_document(contents: &str) -> StorageResult<RecordSet> {
    let mut deserializer = serde_json::Deserializer::from_str(contents);

    let document: StoredDocument = match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            return Err(StorageError::Deserialization {
                path,
                message: err.into_inner().to_string(),
            });
        }
    };

    deserializer
        .end()
        .map_err(|e| StorageError::Deserialization {
            path: "<root>".into(),
            message: e.to_string(),
        })?;

    let mut records = RecordSet::new();

    for (id, draft) in document.0 {
        let draft = PatientDraft {
            id: Some(id.clone()),
            ..draft
        };
        let record = draft.validate().map_err(|source| StorageError::InvalidRecord {
            id: id.clone(),
            source,
        })?;

        records
            .insert_new(record)
            .map_err(|_| StorageError::DuplicateId(id))?;
    }

    Ok(records)
}

fn render_document(records: &RecordSet) -> StorageResult<Vec<u8>> {
    serde_json::to_vec_pretty(&StoredDocumentRef(records)).map_err(StorageError::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Verdict;
    use tempfile::TempDir;

    fn record(id: &str, height: f64, weight: f64) -> PatientRecord {
        PatientDraft {
            id: Some(id.into()),
            name: Some("Karan Kapoor".into()),
            city: Some("Delhi".into()),
            age: Some(52),
            gender: Some("male".into()),
            height: Some(height),
            weight: Some(weight),
        }
        .validate()
        .expect("should validate")
    }

    fn repo_in(temp_dir: &TempDir) -> JsonFileRepository {
        JsonFileRepository::new(temp_dir.path().join("patient.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);

        let records = repo.load_all().expect("missing file should load");
        assert!(records.is_empty());
    }

    #[test]
    fn test_blank_file_loads_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);
        fs::write(repo.path(), "  \n").expect("write blank file");

        let records = repo.load_all().expect("blank file should load");
        assert!(records.is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_records_and_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);

        let mut records = RecordSet::new();
        records.insert_new(record("P003", 1.7, 80.0)).expect("insert");
        records.insert_new(record("P001", 1.6, 50.0)).expect("insert");
        records.insert_new(record("P002", 1.8, 100.0)).expect("insert");

        repo.save_all(&records).expect("save should succeed");
        let loaded = repo.load_all().expect("load should succeed");

        assert_eq!(loaded, records);
        let ids: Vec<&str> = loaded.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["P003", "P001", "P002"]);
        assert!(!repo.temp_path().exists(), "temp file should be renamed away");
    }

    #[test]
    fn test_saved_document_is_keyed_by_id_with_derived_fields() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);

        let mut records = RecordSet::new();
        records.insert_new(record("P001", 1.65, 90.0)).expect("insert");
        repo.save_all(&records).expect("save should succeed");

        let raw = fs::read_to_string(repo.path()).expect("read file");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");

        let entry = &value["P001"];
        assert!(entry.get("id").is_none(), "id is the key, not a field");
        assert_eq!(entry["name"], "Karan Kapoor");
        assert_eq!(entry["gender"], "male");
        assert_eq!(entry["bmi"], 33.06);
        assert_eq!(entry["verdict"], "obese");
    }

    #[test]
    fn test_stale_derived_values_are_recomputed_on_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);
        fs::write(
            repo.path(),
            r#"{"P001": {"name": "Ananya Verma", "city": "Guwahati", "age": 28,
                "gender": "female", "height": 1.65, "weight": 90.0,
                "bmi": 12.5, "verdict": "underweight"}}"#,
        )
        .expect("write file");

        let records = repo.load_all().expect("load should succeed");
        let patient = records.get("P001").expect("P001 present");
        assert_eq!(patient.bmi(), 33.06);
        assert_eq!(patient.verdict(), Verdict::Obese);
    }

    #[test]
    fn test_malformed_json_is_deserialization_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);
        fs::write(repo.path(), "{ not json").expect("write file");

        let err = repo.load_all().expect_err("malformed file should fail");
        assert!(matches!(err, StorageError::Deserialization { .. }));
    }

    #[test]
    fn test_wrong_type_reports_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);
        fs::write(
            repo.path(),
            r#"{"P001": {"name": "A", "city": "B", "age": "old", "gender": "male",
                "height": 1.7, "weight": 70}}"#,
        )
        .expect("write file");

        let err = repo.load_all().expect_err("wrong type should fail");
        match err {
            StorageError::Deserialization { path, .. } => {
                assert!(path.contains("P001"), "path was {path}");
                assert!(path.contains("age"), "path was {path}");
            }
            other => panic!("expected Deserialization error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_stored_record_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);
        fs::write(
            repo.path(),
            r#"{"P001": {"name": "A", "city": "B", "age": 30, "gender": "male",
                "height": 0, "weight": 70}}"#,
        )
        .expect("write file");

        let err = repo.load_all().expect_err("invalid record should fail");
        match err {
            StorageError::InvalidRecord { id, source } => {
                assert_eq!(id, "P001");
                assert!(source.for_field("height").is_some());
            }
            other => panic!("expected InvalidRecord error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);
        let entry = r#"{"name": "A", "city": "B", "age": 30, "gender": "male",
            "height": 1.7, "weight": 70}"#;
        fs::write(repo.path(), format!(r#"{{"P001": {entry}, "P001": {entry}}}"#))
            .expect("write file");

        let err = repo.load_all().expect_err("duplicate ids should fail");
        assert!(matches!(err, StorageError::DuplicateId(id) if id == "P001"));
    }

    #[test]
    fn test_top_level_array_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = repo_in(&temp_dir);
        fs::write(repo.path(), "[]").expect("write file");

        let err = repo.load_all().expect_err("array document should fail");
        assert!(matches!(err, StorageError::Deserialization { .. }));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = JsonFileRepository::new(temp_dir.path().join("missing").join("patient.json"));

        let err = repo
            .save_all(&RecordSet::new())
            .expect_err("save should fail");
        assert!(matches!(err, StorageError::FileWrite { .. }));
    }

    #[test]
    fn test_in_memory_repository_round_trips() {
        let repo = InMemoryRepository::new();
        let mut records = RecordSet::new();
        records.insert_new(record("P001", 1.7, 70.0)).expect("insert");

        repo.save_all(&records).expect("save");
        assert_eq!(repo.load_all().expect("load"), records);
    }
}
