use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PersistError;
use crate::store::DocumentStore;

/// In-memory document store used in tests.
///
/// Mirrors the write semantics of the hosted store: full-document
/// overwrite with a `last_updated` stamp attached at write time. Every
/// write is also recorded so tests can assert on exactly what was
/// persisted.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<(String, String), Value>>,
    writes: Mutex<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes performed over the store's lifetime
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// The (collection, doc_id) pairs written, in order
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn set(
        &self,
        collection: &str,
        doc_id: &str,
        payload: Value,
    ) -> Result<(), PersistError> {
        let Value::Object(mut fields) = payload else {
            return Err(PersistError::MalformedPayload(
                "payload must be a JSON object".to_string(),
            ));
        };

        fields.insert(
            "last_updated".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );

        self.docs.lock().unwrap().insert(
            (collection.to_string(), doc_id.to_string()),
            Value::Object(fields),
        );
        self.writes
            .lock()
            .unwrap()
            .push((collection.to_string(), doc_id.to_string()));
        Ok(())
    }

    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, PersistError> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .get(&(collection.to_string(), doc_id.to_string()))
            .cloned())
    }
}
