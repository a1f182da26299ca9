//! # Patient Core
//!
//! Core business logic for the patient records service.
//!
//! This crate contains the record schema and pure data operations:
//! - Validation of patient records and computation of the derived `bmi`/`verdict`
//! - Partial-update merging with explicit field presence
//! - Sorting of the record set by height, weight or BMI
//! - Whole-file JSON storage behind the [`PatientRepository`] boundary
//!
//! **No API concerns**: HTTP routing, status codes and OpenAPI documentation belong in
//! `api-rest`; argument parsing belongs in `cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod query;
pub mod record;
pub mod record_set;
pub mod repository;
pub mod service;
pub mod update;
pub mod validation;

pub use config::CoreConfig;
pub use constants::DEFAULT_PATIENT_DATA_FILE;
pub use error::{
    PatientError, PatientResult, StorageError, StorageResult, ValidationError, Violation,
    ViolationKind,
};
pub use query::{SortField, SortOrder};
pub use record::{Gender, PatientRecord, Verdict};
pub use record_set::RecordSet;
pub use repository::{InMemoryRepository, JsonFileRepository, PatientRepository};
pub use service::PatientService;
pub use update::{Patch, PatientUpdate};
pub use validation::PatientDraft;
