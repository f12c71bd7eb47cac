pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PersistError;

/// A named document collection keyed by document id.
///
/// Writes are full-document overwrites (last write wins, no merge); the
/// store attaches a server-assigned `last_updated` timestamp at write
/// time. Passed explicitly into each job so tests can substitute a fake
/// store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Overwrite the document wholesale with the given payload
    async fn set(&self, collection: &str, doc_id: &str, payload: Value)
    -> Result<(), PersistError>;

    /// Read a document back, `None` if absent
    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, PersistError>;
}

/// Derive a filesystem/URL-safe stable document id from a topic string
pub fn document_id(topic: &str) -> String {
    topic.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id() {
        assert_eq!(document_id("World News"), "world_news");
        assert_eq!(document_id("Ukraine"), "ukraine");
        assert_eq!(document_id("A B C"), "a_b_c");
    }

    #[test]
    fn test_document_id_is_stable() {
        assert_eq!(document_id("World News"), document_id("World News"));
    }
}
