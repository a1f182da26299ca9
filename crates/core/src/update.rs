//! Partial updates.
//!
//! A [`PatientUpdate`] carries one [`Patch`] per stored attribute. `Patch` keeps the
//! three states apart explicitly, so a field set to a boundary value is never mistaken
//! for a field that was left out.

use crate::error::ValidationError;
use crate::record::PatientRecord;
use crate::validation::PatientDraft;
use serde::{Deserialize, Deserializer};

/// Presence marker for one field of a partial update.
#[derive(Clone, Debug, PartialEq)]
pub enum Patch<T> {
    /// Field not supplied: keep the existing value.
    Absent,
    /// Field supplied as `null`: clear the value.
    Null,
    /// Field supplied: replace the existing value.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Resolve against the current value.
    pub fn merge(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Absent => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Absent,
        }
    }
}

// A missing key never reaches this impl (`#[serde(default)]` yields `Absent`), so
// anything deserialized here was present in the payload.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Sparse set of overrides for the stored attributes of a record.
///
/// `id` is not updatable; payload keys `id`, `bmi` and `verdict` are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PatientUpdate {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub city: Patch<String>,
    #[serde(default)]
    pub age: Patch<i64>,
    #[serde(default)]
    pub gender: Patch<String>,
    #[serde(default)]
    pub height: Patch<f64>,
    #[serde(default)]
    pub weight: Patch<f64>,
}

impl PatientUpdate {
    /// True if no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_absent()
            && self.city.is_absent()
            && self.age.is_absent()
            && self.gender.is_absent()
            && self.height.is_absent()
            && self.weight.is_absent()
    }

    /// Merge onto `existing` and re-validate the result.
    ///
    /// `existing` is never modified; on error the caller still holds the old record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the merged attributes violate any constraint,
    /// including a required field cleared with `null`.
    pub fn apply(&self, existing: &PatientRecord) -> Result<PatientRecord, ValidationError> {
        let base = PatientDraft::from_record(existing);

        let merged = PatientDraft {
            id: base.id,
            name: self.name.clone().merge(base.name),
            city: self.city.clone().merge(base.city),
            age: self.age.clone().merge(base.age),
            gender: self.gender.clone().merge(base.gender),
            height: self.height.clone().merge(base.height),
            weight: self.weight.clone().merge(base.weight),
        };

        merged.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViolationKind;
    use crate::record::Verdict;

    fn existing() -> PatientRecord {
        PatientDraft {
            id: Some("P001".into()),
            name: Some("Ananya Verma".into()),
            city: Some("Guwahati".into()),
            age: Some(28),
            gender: Some("female".into()),
            height: Some(1.65),
            weight: Some(90.0),
        }
        .validate()
        .expect("should validate")
    }

    #[test]
    fn test_deserialize_distinguishes_absent_null_and_value() {
        let update: PatientUpdate =
            serde_json::from_str(r#"{"height": 1.8, "city": null}"#).expect("should parse");

        assert_eq!(update.height, Patch::Value(1.8));
        assert_eq!(update.city, Patch::Null);
        assert_eq!(update.weight, Patch::Absent);
        assert_eq!(update.name, Patch::Absent);
        assert!(!update.is_empty());
    }

    #[test]
    fn test_deserialize_ignores_id_and_derived_fields() {
        let update: PatientUpdate =
            serde_json::from_str(r#"{"id": "P999", "bmi": 12.0, "verdict": "obese"}"#)
                .expect("should parse");
        assert!(update.is_empty());
    }

    #[test]
    fn test_empty_update_is_identity() {
        let record = existing();
        let updated = PatientUpdate::default()
            .apply(&record)
            .expect("empty update should succeed");
        assert_eq!(updated, record);
        assert_eq!(updated.bmi(), record.bmi());
        assert_eq!(updated.verdict(), record.verdict());
    }

    #[test]
    fn test_height_update_recomputes_derived_fields() {
        let record = existing();
        assert_eq!(record.verdict(), Verdict::Obese);

        let update = PatientUpdate {
            height: Patch::Value(1.9),
            ..Default::default()
        };
        let updated = update.apply(&record).expect("update should succeed");

        assert_eq!(updated.id(), "P001");
        assert_eq!(updated.height(), 1.9);
        assert_eq!(updated.name(), record.name());
        assert_eq!(updated.city(), record.city());
        assert_eq!(updated.age(), record.age());
        assert_eq!(updated.gender(), record.gender());
        assert_eq!(updated.weight(), record.weight());
        assert_eq!(updated.bmi(), 24.93);
        assert_eq!(updated.verdict(), Verdict::Normal);
    }

    #[test]
    fn test_zero_height_fails_out_of_range() {
        let record = existing();
        let update = PatientUpdate {
            height: Patch::Value(0.0),
            ..Default::default()
        };

        let err = update.apply(&record).expect_err("zero height should fail");
        assert_eq!(
            err.for_field("height").map(|v| v.kind),
            Some(ViolationKind::OutOfRange)
        );
        assert_eq!(record.height(), 1.65);
    }

    #[test]
    fn test_null_clears_required_field() {
        let update = PatientUpdate {
            name: Patch::Null,
            ..Default::default()
        };
        let err = update.apply(&existing()).expect_err("null name should fail");
        assert_eq!(
            err.for_field("name").map(|v| v.kind),
            Some(ViolationKind::MissingRequired)
        );
    }

    #[test]
    fn test_empty_string_is_a_value_not_absence() {
        let update = PatientUpdate {
            city: Patch::Value(String::new()),
            ..Default::default()
        };
        let updated = update.apply(&existing()).expect("empty city is allowed");
        assert_eq!(updated.city(), "");
    }

    #[test]
    fn test_invalid_gender_rejected() {
        let update = PatientUpdate {
            gender: Patch::Value("robot".into()),
            ..Default::default()
        };
        let err = update.apply(&existing()).expect_err("gender should fail");
        assert!(err.has_kind(ViolationKind::InvalidEnum));
    }
}
