//! Request and response bodies of the REST API.
//!
//! These mirror the core types with OpenAPI schemas attached, keeping `patient-core`
//! free of API concerns.

use patient_core::{Patch, PatientDraft, PatientRecord, PatientUpdate, RecordSet, Violation};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Full representation of a patient: stored attributes plus derived `bmi`/`verdict`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    #[schema(example = "P001")]
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: u32,
    #[schema(example = "female")]
    pub gender: String,
    /// Height in metres.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
    pub bmi: f64,
    #[schema(example = "normal")]
    pub verdict: String,
}

impl From<&PatientRecord> for PatientRes {
    fn from(record: &PatientRecord) -> Self {
        Self {
            id: record.id().to_string(),
            name: record.name().to_string(),
            city: record.city().to_string(),
            age: record.age(),
            gender: record.gender().to_string(),
            height: record.height(),
            weight: record.weight(),
            bmi: record.bmi(),
            verdict: record.verdict().to_string(),
        }
    }
}

/// All patients as an object keyed by id, in storage order.
#[derive(Clone, Debug)]
pub struct PatientMapRes(pub Vec<PatientRes>);

impl From<&RecordSet> for PatientMapRes {
    fn from(records: &RecordSet) -> Self {
        Self(records.iter().map(PatientRes::from).collect())
    }
}

impl Serialize for PatientMapRes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for patient in &self.0 {
            map.serialize_entry(&patient.id, patient)?;
        }
        map.end()
    }
}

/// Body of `POST /create`. `bmi` and `verdict` are computed, never accepted.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    #[schema(example = "P001")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<i64>,
    #[schema(example = "male")]
    pub gender: Option<String>,
    /// Height in metres.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
}

impl From<CreatePatientReq> for PatientDraft {
    fn from(req: CreatePatientReq) -> Self {
        PatientDraft {
            id: req.id,
            name: req.name,
            city: req.city,
            age: req.age,
            gender: req.gender,
            height: req.height,
            weight: req.weight,
        }
    }
}

/// Body of `PUT /edit/{id}`.
///
/// Omitted fields are left unchanged; `null` clears a field (and so fails
/// validation, every field being required).
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePatientReq {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub city: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub age: Patch<i64>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub gender: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub height: Patch<f64>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub weight: Patch<f64>,
}

impl From<UpdatePatientReq> for PatientUpdate {
    fn from(req: UpdatePatientReq) -> Self {
        PatientUpdate {
            name: req.name,
            city: req.city,
            age: req.age,
            gender: req.gender,
            height: req.height,
            weight: req.weight,
        }
    }
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SortParams {
    /// Sort on the basis of `height`, `weight` or `bmi`.
    pub sort_by: Option<String>,
    /// Sort in `asc` (default) or `desc` order.
    pub order: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ViolationRes {
    pub field: String,
    #[schema(example = "out_of_range")]
    pub kind: String,
    pub message: String,
}

impl From<&Violation> for ViolationRes {
    fn from(v: &Violation) -> Self {
        Self {
            field: v.field.clone(),
            kind: v.kind.to_string(),
            message: v.message.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ViolationRes>,
}
