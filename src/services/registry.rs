use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::ListCache;
use crate::db::NodeStore;
use crate::error::StoreError;
use crate::models::{NewNode, NodeRecord, NodeUpdate};

/// CRUD over the operator's node list with a read-through list cache.
///
/// Every successful mutation invalidates the cached list, so the next
/// `list_nodes` goes back to the store.
pub struct NodeRegistry {
    store: Arc<dyn NodeStore>,
    cache: Arc<dyn ListCache>,
    // bumped on every mutation; a list fetched across a bump is not cached
    generation: AtomicU64,
}

impl NodeRegistry {
    pub fn new(store: Arc<dyn NodeStore>, cache: Arc<dyn ListCache>) -> Self {
        Self { store, cache, generation: AtomicU64::new(0) }
    }

    pub fn collection(&self) -> &str {
        self.store.collection()
    }

    pub async fn list_nodes(&self) -> Result<Vec<NodeRecord>, StoreError> {
        let collection = self.store.collection();
        match self.cache.get(collection).await {
            Ok(Some(records)) => {
                debug!("Cache hit for '{}' ({} records)", collection, records.len());
                return Ok(records);
            }
            Ok(None) => debug!("Cache miss for '{}'", collection),
            Err(e) => warn!("Cache read for '{}' failed, using store: {}", collection, e),
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let records = self.store.select_all().await?;
        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(records);
        }
        if let Err(e) = self.cache.put(collection, &records).await {
            warn!("Cache write for '{}' failed: {}", collection, e);
        }
        // a mutation that landed while the put was in flight may have
        // invalidated before our write; drop the entry again
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("List for '{}' went stale while caching, dropping it", collection);
            if let Err(e) = self.cache.invalidate(collection).await {
                error!("Cache invalidation for '{}' failed: {}", collection, e);
            }
        }
        Ok(records)
    }

    pub async fn create_node(&self, node: &NewNode) -> Result<NodeRecord, StoreError> {
        let record = self.store.insert(node).await?;
        info!("Registered node {} at {}", record.id, record.address);
        self.invalidate().await;
        Ok(record)
    }

    pub async fn update_node(&self, id: Uuid, update: &NodeUpdate) -> Result<NodeRecord, StoreError> {
        let record = self.store.update_by_id(id, update).await?;
        info!("Updated node {}", record.id);
        self.invalidate().await;
        Ok(record)
    }

    /// Removing nodes has no backing store operation; the call is refused
    /// without touching the store or the cache.
    pub async fn delete_node(&self, id: Uuid) -> Result<(), StoreError> {
        warn!("Delete requested for node {}, not supported", id);
        Err(StoreError::Unsupported("delete"))
    }

    async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let collection = self.store.collection();
        match self.cache.invalidate(collection).await {
            Ok(()) => debug!("Invalidated cache for '{}'", collection),
            Err(e) => error!("Cache invalidation for '{}' failed: {}", collection, e),
        }
    }
}
