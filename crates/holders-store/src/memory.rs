use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;
use tracing::trace;

use holders_types::OrgNr;

use crate::document::{DocumentFilter, OrganizationSnapshot};
use crate::error::{StoreError, StoreResult};
use crate::traits::ReadStore;

/// In-memory document store.
///
/// Intended for tests and embedding. Documents are held as JSON values, the
/// same shape a document database would persist, and decoded on every read.
pub struct InMemoryReadStore {
    collection: String,
    documents: RwLock<BTreeMap<OrgNr, Value>>,
}

impl InMemoryReadStore {
    /// Create a new empty store for the default `organization` collection.
    pub fn new() -> Self {
        Self::with_collection("organization")
    }

    pub fn with_collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Raw JSON of a stored document, exactly as persisted.
    pub fn raw(&self, id: OrgNr) -> Option<Value> {
        self.documents.read().expect("lock poisoned").get(&id).cloned()
    }

    fn decode(id: OrgNr, value: &Value) -> StoreResult<OrganizationSnapshot> {
        serde_json::from_value(value.clone()).map_err(|e| StoreError::CorruptDocument {
            id,
            reason: e.to_string(),
        })
    }

    fn stored_version(value: &Value) -> u64 {
        value.get("version").and_then(Value::as_u64).unwrap_or(0)
    }

    fn encode(document: &OrganizationSnapshot, version: u64) -> StoreResult<Value> {
        let mut stored = document.clone();
        stored.version = version;
        Ok(serde_json::to_value(&stored)?)
    }
}

impl Default for InMemoryReadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadStore for InMemoryReadStore {
    fn find_one(&self, id: OrgNr) -> StoreResult<Option<OrganizationSnapshot>> {
        let map = self.documents.read().expect("lock poisoned");
        map.get(&id).map(|value| Self::decode(id, value)).transpose()
    }

    fn find_many(&self, filter: &DocumentFilter) -> StoreResult<Vec<OrganizationSnapshot>> {
        let map = self.documents.read().expect("lock poisoned");
        let mut found = Vec::new();
        for (id, value) in map.iter() {
            let document = Self::decode(*id, value)?;
            if filter.matches(&document) {
                found.push(document);
            }
        }
        Ok(found)
    }

    fn insert(&self, document: &OrganizationSnapshot) -> StoreResult<u64> {
        let mut map = self.documents.write().expect("lock poisoned");
        if map.contains_key(&document.id) {
            return Err(StoreError::AlreadyExists(document.id));
        }
        map.insert(document.id, Self::encode(document, 1)?);
        trace!(collection = %self.collection, id = %document.id, "document inserted");
        Ok(1)
    }

    fn replace(&self, id: OrgNr, document: &OrganizationSnapshot) -> StoreResult<u64> {
        let mut map = self.documents.write().expect("lock poisoned");
        let current = map.get(&id).ok_or(StoreError::NotFound(id))?;
        let version = Self::stored_version(current) + 1;
        let mut replacement = document.clone();
        replacement.id = id;
        map.insert(id, Self::encode(&replacement, version)?);
        trace!(collection = %self.collection, %id, version, "document replaced");
        Ok(version)
    }

    fn upsert(&self, document: &OrganizationSnapshot) -> StoreResult<u64> {
        let mut map = self.documents.write().expect("lock poisoned");
        let actual = map.get(&document.id).map(Self::stored_version).unwrap_or(0);
        if actual != document.version {
            return Err(StoreError::VersionConflict {
                id: document.id,
                expected: document.version,
                actual,
            });
        }
        let version = actual + 1;
        map.insert(document.id, Self::encode(document, version)?);
        trace!(collection = %self.collection, id = %document.id, version, "document upserted");
        Ok(version)
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.documents.read().expect("lock poisoned").len())
    }
}

impl std::fmt::Debug for InMemoryReadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.documents.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryReadStore")
            .field("collection", &self.collection)
            .field("document_count", &count)
            .finish()
    }
}
