//! Record validation.
//!
//! A [`PatientDraft`] is an unchecked candidate set of stored attributes. Every field is
//! optional so that absence is reported as a violation rather than a parse failure, and
//! [`PatientDraft::validate`] reports every violated constraint in one pass.
//!
//! `bmi` and `verdict` are not part of the draft. Inbound payloads that carry them have
//! those keys ignored; the values are always recomputed from `height` and `weight`.

use crate::constants::GENDERS;
use crate::error::{ValidationError, Violation, ViolationKind};
use crate::record::{Gender, PatientId, PatientRecord};
use serde::Deserialize;

/// Candidate stored attributes of a patient record.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PatientDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl PatientDraft {
    /// Seed a draft with the stored attributes of an existing record.
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            id: Some(record.id().to_string()),
            name: Some(record.name().to_string()),
            city: Some(record.city().to_string()),
            age: Some(i64::from(record.age())),
            gender: Some(record.gender().as_str().to_string()),
            height: Some(record.height()),
            weight: Some(record.weight()),
        }
    }

    /// Check every field constraint and materialise the record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every violated constraint, in field order.
    pub fn validate(self) -> Result<PatientRecord, ValidationError> {
        let mut violations = Vec::new();

        let id = match self.id {
            Some(raw) => {
                let id = PatientId::new(raw);
                if id.is_none() {
                    violations.push(Violation::new(
                        "id",
                        ViolationKind::MissingRequired,
                        "id cannot be empty",
                    ));
                }
                id
            }
            None => {
                violations.push(missing("id"));
                None
            }
        };

        let name = required(self.name, "name", &mut violations);
        let city = required(self.city, "city", &mut violations);

        let age = match self.age {
            Some(age) => match u32::try_from(age) {
                Ok(age) if age > 0 => Some(age),
                _ => {
                    violations.push(Violation::new(
                        "age",
                        ViolationKind::OutOfRange,
                        format!("age must be a positive integer, got {age}"),
                    ));
                    None
                }
            },
            None => {
                violations.push(missing("age"));
                None
            }
        };

        let gender = match self.gender {
            Some(raw) => match raw.parse::<Gender>() {
                Ok(gender) => Some(gender),
                Err(()) => {
                    violations.push(Violation::new(
                        "gender",
                        ViolationKind::InvalidEnum,
                        format!("gender must be one of {GENDERS:?}, got {raw:?}"),
                    ));
                    None
                }
            },
            None => {
                violations.push(missing("gender"));
                None
            }
        };

        let height = positive(self.height, "height", "m", &mut violations);
        let weight = positive(self.weight, "weight", "kg", &mut violations);

        match (id, name, city, age, gender, height, weight) {
            (Some(id), Some(name), Some(city), Some(age), Some(gender), Some(height), Some(weight)) => {
                Ok(PatientRecord::from_validated(
                    id, name, city, age, gender, height, weight,
                ))
            }
            _ => Err(ValidationError { violations }),
        }
    }
}

fn missing(field: &str) -> Violation {
    Violation::new(
        field,
        ViolationKind::MissingRequired,
        format!("{field} is required"),
    )
}

fn required(value: Option<String>, field: &str, violations: &mut Vec<Violation>) -> Option<String> {
    if value.is_none() {
        violations.push(missing(field));
    }
    value
}

fn positive(
    value: Option<f64>,
    field: &str,
    unit: &str,
    violations: &mut Vec<Violation>,
) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Some(v),
        Some(v) => {
            violations.push(Violation::new(
                field,
                ViolationKind::OutOfRange,
                format!("{field} must be greater than 0 {unit}, got {v}"),
            ));
            None
        }
        None => {
            violations.push(missing(field));
            None
        }
    }
}
