//! Keyed resource table - one instance per resource kind

use crate::error::{Error, Result};
use crate::resource::Record;
use std::collections::BTreeMap;

/// At most one record per identity key, iterated in key order
#[derive(Debug, Clone)]
pub struct ResourceTable<R: Record> {
    records: BTreeMap<R::Key, R>,
}

impl<R: Record> ResourceTable<R> {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Insert a record under its own key, returning any record it replaced
    pub fn insert(&mut self, record: R) -> Option<R> {
        self.records.insert(record.key(), record)
    }

    /// Replace an existing record, returning the previous snapshot.
    ///
    /// Fails with `KeyNotFound` if nothing is stored under the record's key;
    /// the table is left unchanged in that case.
    pub fn replace(&mut self, record: R) -> Result<R> {
        match self.records.get_mut(&record.key()) {
            Some(slot) => Ok(std::mem::replace(slot, record)),
            None => Err(Error::key_not_found(R::KIND, record.key())),
        }
    }

    pub fn remove(&mut self, key: &R::Key) -> Result<R> {
        self.records
            .remove(key)
            .ok_or_else(|| Error::key_not_found(R::KIND, key))
    }

    pub fn get(&self, key: &R::Key) -> Result<&R> {
        self.records
            .get(key)
            .ok_or_else(|| Error::key_not_found(R::KIND, key))
    }

    pub fn contains(&self, key: &R::Key) -> bool {
        self.records.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Record> Default for ResourceTable<R> {
    fn default() -> Self {
        Self::new()
    }
}
