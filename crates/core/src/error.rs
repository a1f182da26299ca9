use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Category of a single field constraint failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingRequired,
    OutOfRange,
    InvalidEnum,
    InvalidField,
    InvalidDirection,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::MissingRequired => "missing_required",
            ViolationKind::OutOfRange => "out_of_range",
            ViolationKind::InvalidEnum => "invalid_enum",
            ViolationKind::InvalidField => "invalid_field",
            ViolationKind::InvalidDirection => "invalid_direction",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One violated constraint, identifying the offending field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Every constraint a candidate record (or query) failed.
///
/// Never empty when returned from a validator: a draft with no violations
/// becomes a record instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}", display_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn display_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Build an error carrying a single violation.
    pub fn single(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation::new(field, kind, message)],
        }
    }

    /// True if any violation has the given kind.
    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    /// Returns the violation reported for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.field == field)
    }
}

/// Failures of the repository façade.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read patient data file {path}: {source}", path = path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write patient data file {path}: {source}", path = path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize patient records: {0}")]
    Serialization(serde_json::Error),
    #[error("patient data file is corrupt at {path}: {message}")]
    Deserialization { path: String, message: String },
    #[error("patient data file contains duplicate id: {0}")]
    DuplicateId(String),
    #[error("stored patient {id} is invalid: {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: ValidationError,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("patient not found: {0}")]
    NotFound(String),
    #[error("patient id already exists: {0}")]
    Duplicate(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
