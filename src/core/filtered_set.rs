//! The filtered view over an inventory and the in-place removals it supports.

use super::RecordHandle;
use std::path::Path;
use std::sync::Arc;

/// An ordered list of shared record handles derived from an inventory.
///
/// Removing a record here never touches the inventory it came from.
#[derive(Debug, Clone, Default)]
pub struct FilteredSet {
    records: Vec<RecordHandle>,
}

impl FilteredSet {
    pub fn from_records(records: Vec<RecordHandle>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecordHandle> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[RecordHandle] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&RecordHandle> {
        self.records.get(index)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn find_by_path(&self, path: &Path) -> Option<&RecordHandle> {
        self.records.iter().find(|r| r.path() == path)
    }

    /// Removes `record` by identity. Returns `false` if it was not present.
    pub fn remove_one(&mut self, record: &RecordHandle) -> bool {
        match self.records.iter().position(|r| Arc::ptr_eq(r, record)) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every record whose status is `Copied`, keeping the rest in order.
    /// Returns the number of records removed.
    pub fn remove_all_copied(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !r.is_copied());
        before - self.records.len()
    }
}

impl<'a> IntoIterator for &'a FilteredSet {
    type Item = &'a RecordHandle;
    type IntoIter = std::slice::Iter<'a, RecordHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
