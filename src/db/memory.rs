use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{NodeStore, NODES_TABLE};
use crate::error::StoreError;
use crate::models::{NewNode, NodeRecord, NodeUpdate};

/// Process-local store for offline runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<NodeRecord>>,
    selects: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the collection has been read from this store.
    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    fn collection(&self) -> &str {
        NODES_TABLE
    }

    async fn select_all(&self) -> Result<Vec<NodeRecord>, StoreError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        // newest insert first among equal timestamps
        let mut records: Vec<NodeRecord> = self.records.read().await.iter().rev().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn insert(&self, node: &NewNode) -> Result<NodeRecord, StoreError> {
        let now = Utc::now();
        let record = NodeRecord {
            id: Uuid::new_v4(),
            address: node.address.clone(),
            status: node.status.clone(),
            block_height: node.block_height,
            peer_count: node.peer_count,
            uptime: node.uptime.clone(),
            created_at: now,
            updated_at: now,
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_by_id(&self, id: Uuid, update: &NodeUpdate) -> Result<NodeRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound { id })?;
        update.apply_to(record);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}
