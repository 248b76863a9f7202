//! Client-side record list and its filtered view.

use thiserror::Error;

use crate::domain::{EmployeeRecord, RecordKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Position {position} is out of range for {len} record(s)")]
    PositionOutOfRange { position: usize, len: usize },
}

/// One row of the filtered view. `key.position` indexes the full list.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredEntry {
    pub key: RecordKey,
    pub record: EmployeeRecord,
}

/// Ordered employee list plus the view derived from the active search term.
///
/// The view is stored as positions into `records` and is only ever written
/// by `recompute_filter`, which every mutator calls.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<EmployeeRecord>,
    search_term: String,
    filtered: Vec<usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filtered(&self) -> Vec<FilteredEntry> {
        self.filtered
            .iter()
            .map(|&position| {
                let record = &self.records[position];
                FilteredEntry {
                    key: record.key(position),
                    record: record.clone(),
                }
            })
            .collect()
    }

    /// Appends a record. Clears any active search.
    pub fn add(&mut self, record: EmployeeRecord) {
        self.records.push(record);
        self.search_term.clear();
        self.recompute_filter();
    }

    /// Filters by `idNumber` substring. An empty term shows every record.
    pub fn search(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.recompute_filter();
    }

    /// Removes the record at `position` in the full list. Clears any active
    /// search.
    pub fn remove(&mut self, position: usize) -> Result<EmployeeRecord, StoreError> {
        self.check_position(position)?;
        let removed = self.records.remove(position);
        self.search_term.clear();
        self.recompute_filter();
        Ok(removed)
    }

    /// Replaces the record at `position` in the full list, returning the
    /// previous one. Clears any active search.
    pub fn update(&mut self, position: usize, record: EmployeeRecord) -> Result<EmployeeRecord, StoreError> {
        self.check_position(position)?;
        let previous = std::mem::replace(&mut self.records[position], record);
        self.search_term.clear();
        self.recompute_filter();
        Ok(previous)
    }

    /// Current position of the record `key` points at, if it is still here.
    pub fn resolve(&self, key: &RecordKey) -> Option<usize> {
        match self.records.get(key.position) {
            Some(record) if key.matches(record) => Some(key.position),
            _ => self.records.iter().position(|record| key.matches(record)),
        }
    }

    fn check_position(&self, position: usize) -> Result<(), StoreError> {
        if position < self.records.len() {
            Ok(())
        } else {
            Err(StoreError::PositionOutOfRange {
                position,
                len: self.records.len(),
            })
        }
    }

    fn recompute_filter(&mut self) {
        let term = self.search_term.as_str();
        self.filtered = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                term.is_empty() || (!record.id_number.is_empty() && record.id_number.contains(term))
            })
            .map(|(position, _)| position)
            .collect();
    }
}
