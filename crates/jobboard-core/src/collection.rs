//! The identifier-indexed job collection.

use std::collections::HashMap;

use serde_json::Value;

use crate::{Error, JobId, JobRecord};

/// Ordered set of job records with an identifier index.
///
/// Records keep the order they were loaded (or inserted) in. The index maps
/// each id to its position in `records`; both are only ever changed
/// together.
#[derive(Debug, Default, Clone)]
pub struct JobCollection {
    records: Vec<JobRecord>,
    index: HashMap<JobId, usize>,
}

/// Outcome of a bulk [`JobCollection::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of distinct records now in the collection.
    pub loaded: usize,
    /// Entries that repeated an earlier id and were merged into it.
    pub merged_duplicates: usize,
    /// Entries that were skipped, as `MalformedRecord` errors.
    pub rejected: Vec<Error>,
}

impl JobCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection's contents with `entries`.
    ///
    /// Entries that are not objects or carry no usable `id` are skipped and
    /// reported; the remaining entries still load. An entry repeating an
    /// earlier id is merged into the earlier record.
    pub fn load(&mut self, entries: Vec<Value>) -> LoadReport {
        self.clear();

        let mut report = LoadReport::default();
        for (index, entry) in entries.into_iter().enumerate() {
            match JobRecord::from_value(entry) {
                Ok(record) => {
                    if let Some(existing) = self.find_mut(&record.id) {
                        existing.merge(record.fields);
                        report.merged_duplicates += 1;
                    } else {
                        self.push(record);
                    }
                }
                Err(reason) => report
                    .rejected
                    .push(Error::MalformedRecord { index, reason }),
            }
        }

        report.loaded = self.records.len();
        report
    }

    /// Look up a record by id.
    pub fn find(&self, id: &JobId) -> Option<&JobRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    /// Look up a record by id for in-place mutation.
    pub fn find_mut(&mut self, id: &JobId) -> Option<&mut JobRecord> {
        self.index.get(id).map(|&pos| &mut self.records[pos])
    }

    /// Append a record whose id is not yet present.
    ///
    /// Returns the record back if the id is already taken.
    pub fn insert(&mut self, record: JobRecord) -> std::result::Result<(), JobRecord> {
        if self.index.contains_key(&record.id) {
            return Err(record);
        }
        self.push(record);
        Ok(())
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &JobRecord> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &JobId> {
        self.records.iter().map(|r| &r.id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    fn push(&mut self, record: JobRecord) {
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
    }
}
