//! Patient record schema.
//!
//! A [`PatientRecord`] holds only stored attributes. The derived `bmi` and `verdict`
//! are methods evaluated from `height`/`weight` on every call and are written out at
//! serialisation time, so they can never drift from the stored values.
//!
//! Records are only produced by [`crate::validation`], which means every record in
//! existence satisfies the field constraints.

use crate::constants::{BMI_NORMAL_MIN, BMI_OBESE_MIN};
use crate::query::SortField;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient gender as accepted on input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BMI classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Underweight,
    Normal,
    Obese,
}

impl Verdict {
    /// Bucket a (rounded) BMI value.
    ///
    /// Both band boundaries are inclusive on the upper band: 18.5 is `Normal`,
    /// 30 is `Obese`.
    pub fn classify(bmi: f64) -> Self {
        if bmi < BMI_NORMAL_MIN {
            Verdict::Underweight
        } else if bmi < BMI_OBESE_MIN {
            Verdict::Normal
        } else {
            Verdict::Obese
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Underweight => "underweight",
            Verdict::Normal => "normal",
            Verdict::Obese => "obese",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body mass index: `weight / height²`, rounded to two decimal places.
pub fn compute_bmi(height: f64, weight: f64) -> f64 {
    round_2dp(weight / (height * height))
}

/// Rounds the exact binary value to the nearest two-decimal figure, ties to even.
fn round_2dp(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Identifier of a patient record.
///
/// Guaranteed to contain at least one non-whitespace character. Unlike free text the
/// value is stored exactly as supplied, since it is used as a lookup key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatientId(String);

impl PatientId {
    /// Returns `None` if `input` is empty or whitespace only.
    pub fn new(input: impl Into<String>) -> Option<Self> {
        let input = input.into();
        if input.trim().is_empty() {
            return None;
        }
        Some(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated patient record.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientRecord {
    id: PatientId,
    name: String,
    city: String,
    age: u32,
    gender: Gender,
    height: f64,
    weight: f64,
}

impl PatientRecord {
    /// Assemble a record from already-validated parts.
    pub(crate) fn from_validated(
        id: PatientId,
        name: String,
        city: String,
        age: u32,
        gender: Gender,
        height: f64,
        weight: f64,
    ) -> Self {
        Self {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Height in metres.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Weight in kilograms.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn bmi(&self) -> f64 {
        compute_bmi(self.height, self.weight)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::classify(self.bmi())
    }

    /// Numeric value used when ordering by `field`.
    ///
    /// Non-finite values (a BMI that overflowed, for instance) are reported as absent.
    pub fn metric(&self, field: SortField) -> Option<f64> {
        let value = match field {
            SortField::Height => self.height,
            SortField::Weight => self.weight,
            SortField::Bmi => self.bmi(),
        };
        Some(value).filter(|v| v.is_finite())
    }
}

#[derive(Serialize)]
struct PatientRecordView<'a> {
    id: &'a str,
    name: &'a str,
    city: &'a str,
    age: u32,
    gender: Gender,
    height: f64,
    weight: f64,
    bmi: f64,
    verdict: Verdict,
}

impl Serialize for PatientRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        PatientRecordView {
            id: self.id(),
            name: &self.name,
            city: &self.city,
            age: self.age,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            bmi: self.bmi(),
            verdict: self.verdict(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::PatientDraft;

    fn record(height: f64, weight: f64) -> PatientRecord {
        PatientDraft {
            id: Some("P001".into()),
            name: Some("Ananya Verma".into()),
            city: Some("Guwahati".into()),
            age: Some(28),
            gender: Some("female".into()),
            height: Some(height),
            weight: Some(weight),
        }
        .validate()
        .expect("draft should be valid")
    }

    #[test]
    fn test_bmi_is_rounded_to_two_places() {
        assert_eq!(compute_bmi(1.65, 90.0), 33.06);
        assert_eq!(compute_bmi(1.75, 70.0), 22.86);
        assert_eq!(compute_bmi(2.0, 80.0), 20.0);
        // 48.4 / 1.76² is exactly 15.625
        assert_eq!(compute_bmi(1.76, 48.4), 15.62);
    }

    #[test]
    fn test_round_2dp_does_not_round_scaled_value() {
        assert_eq!(round_2dp(15.625), 15.62);
        assert_eq!(round_2dp(2.675), 2.67);
        assert_eq!(round_2dp(24.005), 24.0);
        assert_eq!(round_2dp(0.125), 0.12);
        assert_eq!(round_2dp(33.058), 33.06);
    }

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(Verdict::classify(18.49), Verdict::Underweight);
        assert_eq!(Verdict::classify(18.5), Verdict::Normal);
        assert_eq!(Verdict::classify(29.99), Verdict::Normal);
        assert_eq!(Verdict::classify(30.0), Verdict::Obese);
    }

    #[test]
    fn test_verdict_uses_rounded_bmi() {
        // 18.496... rounds to 18.5
        let r = record(1.0, 18.496);
        assert_eq!(r.bmi(), 18.5);
        assert_eq!(r.verdict(), Verdict::Normal);

        let r = record(1.0, 30.0);
        assert_eq!(r.verdict(), Verdict::Obese);

        let r = record(1.8, 50.0);
        assert_eq!(r.verdict(), Verdict::Underweight);
    }

    #[test]
    fn test_derived_fields_follow_height_and_weight() {
        let r = record(1.65, 90.0);
        assert_eq!(r.bmi(), 33.06);
        assert_eq!(r.verdict(), Verdict::Obese);
    }

    #[test]
    fn test_serializes_stored_and_derived_fields() {
        let r = record(2.0, 80.0);
        let value = serde_json::to_value(&r).expect("serialize record");

        assert_eq!(value["id"], "P001");
        assert_eq!(value["name"], "Ananya Verma");
        assert_eq!(value["city"], "Guwahati");
        assert_eq!(value["age"], 28);
        assert_eq!(value["gender"], "female");
        assert_eq!(value["height"], 2.0);
        assert_eq!(value["weight"], 80.0);
        assert_eq!(value["bmi"], 20.0);
        assert_eq!(value["verdict"], "normal");
    }

    #[test]
    fn test_metric_reports_non_finite_as_absent() {
        let r = record(1e-200, 80.0);
        assert_eq!(r.metric(SortField::Bmi), None);
        assert_eq!(r.metric(SortField::Height), Some(1e-200));
    }

    #[test]
    fn test_patient_id_rejects_blank() {
        assert!(PatientId::new("").is_none());
        assert!(PatientId::new("   ").is_none());
        assert_eq!(PatientId::new("P001").map(|id| id.to_string()), Some("P001".into()));
    }

    #[test]
    fn test_gender_parses_exact_lowercase_only() {
        assert_eq!("male".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("other".parse::<Gender>(), Ok(Gender::Other));
        assert!("Male".parse::<Gender>().is_err());
        assert!("unknown".parse::<Gender>().is_err());
    }
}
