use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{RequestStore, StoreError, StoredCollection, StoredRequest};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: DashMap<i64, StoredCollection>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }

    pub fn with_collections(collections: impl IntoIterator<Item = StoredCollection>) -> Self {
        let store = Self::new();
        for collection in collections {
            store.insert_collection(collection);
        }
        store
    }

    /// Load `[{id, name, requests: [...]}]` from a JSON file.
    pub fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let collections: Vec<StoredCollection> = serde_json::from_str(&content)?;
        tracing::info!(path = %path.display(), collections = collections.len(), "Seeded collection store");
        Ok(Self::with_collections(collections))
    }

    /// Replaces any collection with the same id.
    pub fn insert_collection(&self, collection: StoredCollection) {
        self.collections.insert(collection.id, collection);
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

#[async_trait]
impl RequestStore for InMemoryStore {
    async fn collection_exists(&self, collection_id: i64) -> Result<bool, StoreError> {
        Ok(self.collections.contains_key(&collection_id))
    }

    async fn get_request(
        &self,
        collection_id: i64,
        request_id: i64,
    ) -> Result<Option<StoredRequest>, StoreError> {
        Ok(self.collections.get(&collection_id).and_then(|collection| {
            collection
                .requests
                .iter()
                .find(|request| request.id == request_id)
                .cloned()
        }))
    }
}
