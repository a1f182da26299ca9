//! Ordering of the record set by a numeric field.

use crate::constants::{SORT_FIELDS, SORT_ORDERS};
use crate::error::{ValidationError, ViolationKind};
use crate::record::PatientRecord;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Field a record set may be sorted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Height => "height",
            SortField::Weight => "weight",
            SortField::Bmi => "bmi",
        }
    }
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(SortField::Height),
            "weight" => Ok(SortField::Weight),
            "bmi" => Ok(SortField::Bmi),
            other => Err(ValidationError::single(
                "sort_by",
                ViolationKind::InvalidField,
                format!("invalid field {other:?}, select from {SORT_FIELDS:?}"),
            )),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction; ascending unless stated otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse an optional direction, defaulting to [`SortOrder::Asc`].
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, ValidationError> {
        value.map_or(Ok(SortOrder::Asc), |v| v.parse())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ValidationError::single(
                "order",
                ViolationKind::InvalidDirection,
                format!("invalid order {other:?}, select between {SORT_ORDERS:?}"),
            )),
        }
    }
}

/// Stable sort of `records` by `field`.
///
/// A record without a usable value for `field` sorts as `0.0`. Ties keep their input
/// order in both directions.
pub fn sort_records<I>(records: I, field: SortField, order: SortOrder) -> Vec<PatientRecord>
where
    I: IntoIterator<Item = PatientRecord>,
{
    let mut sorted: Vec<PatientRecord> = records.into_iter().collect();

    // `sort_by` is stable; reversing the comparator keeps ties in input order.
    sorted.sort_by(|a, b| {
        let ord = compare(a, b, field);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    sorted
}

/// Compare two records the way [`sort_records`] would.
pub fn compare(a: &PatientRecord, b: &PatientRecord, field: SortField) -> Ordering {
    let ka = a.metric(field).unwrap_or(0.0);
    let kb = b.metric(field).unwrap_or(0.0);
    ka.total_cmp(&kb)
}
