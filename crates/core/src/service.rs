//! Patient record operations.
//!
//! Every operation loads the full record set from the repository, transforms it in
//! memory and, for mutations, saves the full set back. Nothing is cached between
//! calls. A failed validation or save leaves storage untouched.
//!
//! ## Pure Data Operations
//!
//! This module contains **only** data operations. HTTP status codes, request parsing
//! and response shapes belong in `api-rest`.

use crate::config::CoreConfig;
use crate::error::{PatientError, PatientResult};
use crate::query::{sort_records, SortField, SortOrder};
use crate::record::PatientRecord;
use crate::record_set::RecordSet;
use crate::repository::{JsonFileRepository, PatientRepository};
use crate::update::PatientUpdate;
use crate::validation::PatientDraft;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Service for patient record operations.
///
/// Cloning is cheap and clones share the repository and the write lock, so
/// load-mutate-save sequences from different clones never interleave.
#[derive(Clone)]
pub struct PatientService {
    repository: Arc<dyn PatientRepository>,
    write_lock: Arc<Mutex<()>>,
}

impl PatientService {
    pub fn new(repository: Arc<dyn PatientRepository>) -> Self {
        Self {
            repository,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Service backed by the JSON data file named in `cfg`.
    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(Arc::new(JsonFileRepository::new(cfg.patient_data_file())))
    }

    /// Held for the whole of a load-mutate-save sequence.
    ///
    /// Blocking: async callers hold it, and do the file I/O, on the runtime worker
    /// thread. The store is a single small local file.
    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns every stored record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Storage` if the data file cannot be read or parsed.
    pub fn list_patients(&self) -> PatientResult<RecordSet> {
        Ok(self.repository.load_all()?)
    }

    /// Returns the record with the given id.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no record has that id.
    pub fn get_patient(&self, id: &str) -> PatientResult<PatientRecord> {
        let records = self.repository.load_all()?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| PatientError::NotFound(id.to_string()))
    }

    /// Returns all records ordered by `sort_by`.
    ///
    /// The parameters are checked before storage is touched. `order` defaults to
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` with kind `invalid_field` or
    /// `invalid_direction` for unsupported parameters.
    pub fn sort_patients(
        &self,
        sort_by: &str,
        order: Option<&str>,
    ) -> PatientResult<Vec<PatientRecord>> {
        let field: SortField = sort_by.parse()?;
        let order = SortOrder::parse_or_default(order)?;

        let records = self.repository.load_all()?;
        Ok(sort_records(records, field, order))
    }

    /// Validates `draft` and stores it as a new record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - the draft violates any field constraint (`Validation`),
    /// - a record with the same id exists (`Duplicate`),
    /// - storage fails (`Storage`).
    pub fn create_patient(&self, draft: PatientDraft) -> PatientResult<PatientRecord> {
        let record = draft.validate()?;

        let _guard = self.write_guard();
        let mut records = self.repository.load_all()?;
        records.insert_new(record.clone())?;
        self.repository.save_all(&records)?;

        tracing::info!("created patient {}", record.id());
        Ok(record)
    }

    /// Applies a partial update to an existing record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - no record has that id (`NotFound`),
    /// - the merged record violates any field constraint (`Validation`),
    /// - storage fails (`Storage`).
    pub fn update_patient(&self, id: &str, update: &PatientUpdate) -> PatientResult<PatientRecord> {
        let _guard = self.write_guard();
        let mut records = self.repository.load_all()?;

        let existing = records
            .get(id)
            .ok_or_else(|| PatientError::NotFound(id.to_string()))?;
        let updated = update.apply(existing)?;

        records.replace(updated.clone());
        self.repository.save_all(&records)?;

        tracing::info!("updated patient {}", id);
        Ok(updated)
    }

    /// Removes the record with the given id.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no record has that id.
    pub fn delete_patient(&self, id: &str) -> PatientResult<()> {
        let _guard = self.write_guard();
        let mut records = self.repository.load_all()?;

        if records.remove(id).is_none() {
            return Err(PatientError::NotFound(id.to_string()));
        }
        self.repository.save_all(&records)?;

        tracing::info!("deleted patient {}", id);
        Ok(())
    }
}
