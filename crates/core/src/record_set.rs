//! The full collection of patient records.

use crate::error::{PatientError, PatientResult};
use crate::record::PatientRecord;
use serde::ser::SerializeMap;
use serde::Serialize;

/// Records keyed by id, in insertion order.
///
/// Ids are unique. Replacing a record keeps its position, so iteration order is the
/// order records were first created (or first appeared in the data file).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<PatientRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatientRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&PatientRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a record with a previously unused id.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Duplicate` if the id is already present; the set is unchanged.
    pub fn insert_new(&mut self, record: PatientRecord) -> PatientResult<()> {
        if self.contains(record.id()) {
            return Err(PatientError::Duplicate(record.id().to_string()));
        }
        self.records.push(record);
        Ok(())
    }

    /// Swap in a new version of an existing record, returning the old one.
    ///
    /// Returns `None` (and leaves the set unchanged) if no record has that id.
    pub fn replace(&mut self, record: PatientRecord) -> Option<PatientRecord> {
        let slot = self.records.iter_mut().find(|r| r.id() == record.id())?;
        Some(std::mem::replace(slot, record))
    }

    pub fn remove(&mut self, id: &str) -> Option<PatientRecord> {
        let index = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(index))
    }
}

impl IntoIterator for RecordSet {
    type Item = PatientRecord;
    type IntoIter = std::vec::IntoIter<PatientRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a PatientRecord;
    type IntoIter = std::slice::Iter<'a, PatientRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Serialises as an object keyed by id, each value the full record.
impl Serialize for RecordSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(record.id(), record)?;
        }
        map.end()
    }
}
