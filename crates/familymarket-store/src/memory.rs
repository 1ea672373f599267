//! In-memory store backend for tests.

use std::collections::{HashMap, HashSet};

use familymarket_core::{Error, Result};
use parking_lot::RwLock;
use serde_json::Value;

/// Insertion-ordered document collections plus a write counter, so tests
/// can assert both result membership and the absence of writes.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, Value)>>>,
    failing: RwLock<HashSet<String>>,
    writes: RwLock<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, id: &str, doc: Value) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push((id.to_string(), doc));
    }

    /// Make subsequent reads of one collection fail, to exercise
    /// per-collection failure isolation.
    pub fn fail_collection(&self, collection: &str) {
        self.failing.write().insert(collection.to_string());
    }

    pub fn write_count(&self) -> usize {
        *self.writes.read()
    }

    pub fn fetch_recent(&self, collection: &str, cap: usize) -> Result<Vec<(String, Value)>> {
        if self.failing.read().contains(collection) {
            return Err(Error::Store(format!("simulated failure on {collection}")));
        }
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().take(cap).cloned().collect())
            .unwrap_or_default())
    }

    pub fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        if self.failing.read().contains(collection) {
            return Err(Error::Store(format!("simulated failure on {collection}")));
        }
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    /// Deep-merge `fields` into a document, creating it if absent.
    pub fn merge_document(&self, collection: &str, id: &str, fields: &Value) -> Result<()> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
            Some((_, doc)) => merge(doc, fields),
            None => docs.push((id.to_string(), fields.clone())),
        }
        *self.writes.write() += 1;
        Ok(())
    }
}

fn merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}
