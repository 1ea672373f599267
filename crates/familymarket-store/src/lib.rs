//! Document-store boundary: normalized listing types, a Firestore REST
//! client, and an in-memory backend for tests.
//!
//! Handlers receive a [`StoreBackend`] by reference; there is no ambient
//! store singleton anywhere in the workspace.

pub mod firestore;
pub mod memory;
pub mod types;
pub mod value;

pub use firestore::FirestoreClient;
pub use memory::MemoryStore;
pub use types::{subscription_status, Listing, ListingKind, SearchResult};

use familymarket_core::Result;

/// Unified store backend. Enum dispatch keeps the async methods
/// dyn-free while letting tests swap in [`MemoryStore`].
pub enum StoreBackend {
    Firestore(FirestoreClient),
    Memory(MemoryStore),
}

impl StoreBackend {
    /// Fetch up to `cap` recent raw documents from a collection.
    /// An empty collection is not an error.
    pub async fn fetch_recent(
        &self,
        collection: &str,
        cap: usize,
    ) -> Result<Vec<(String, serde_json::Value)>> {
        match self {
            StoreBackend::Firestore(client) => client.list_documents(collection, cap).await,
            StoreBackend::Memory(store) => store.fetch_recent(collection, cap),
        }
    }

    /// Fetch and normalize the recent window of one listing collection.
    pub async fn fetch_listings(&self, kind: ListingKind, cap: usize) -> Result<Vec<Listing>> {
        let docs = self.fetch_recent(kind.collection(), cap).await?;
        Ok(docs
            .into_iter()
            .map(|(id, doc)| Listing::from_document(kind, id, &doc))
            .collect())
    }

    /// Fetch a user document by id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<serde_json::Value>> {
        match self {
            StoreBackend::Firestore(client) => client.get_document("users", user_id).await,
            StoreBackend::Memory(store) => store.get_document("users", user_id),
        }
    }

    /// Write the subscription lifecycle state on a user document.
    pub async fn set_subscription_status(&self, user_id: &str, status: &str) -> Result<()> {
        let fields = serde_json::json!({ "suscripcion": { "estado": status } });
        match self {
            StoreBackend::Firestore(client) => {
                client
                    .patch_fields("users", user_id, &["suscripcion.estado"], &fields)
                    .await
            }
            StoreBackend::Memory(store) => store.merge_document("users", user_id, &fields),
        }
    }
}
