//! Constants used throughout the patient core crate.

/// Default location of the patient data document when no explicit path is configured.
pub const DEFAULT_PATIENT_DATA_FILE: &str = "patient.json";

/// Suffix appended to the data file name while a save is in flight.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

/// Lower bound (inclusive) of the `normal` BMI band.
pub const BMI_NORMAL_MIN: f64 = 18.5;

/// Lower bound (inclusive) of the `obese` BMI band.
pub const BMI_OBESE_MIN: f64 = 30.0;

/// Accepted values of the `gender` field.
pub const GENDERS: [&str; 3] = ["male", "female", "other"];

/// Accepted values of the sort `sort_by` key.
pub const SORT_FIELDS: [&str; 3] = ["height", "weight", "bmi"];

/// Accepted values of the sort direction.
pub const SORT_ORDERS: [&str; 2] = ["asc", "desc"];
