use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NewNode, NodeRecord, NodeUpdate};

pub mod memory;
pub mod nodes;
pub mod rest;

pub use memory::MemoryStore;
pub use nodes::PgStore;
pub use rest::{RestStore, StoreConfig};

pub const NODES_TABLE: &str = "nodes";

/// One collection of node records held by an external store.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Name of the collection, also used as the cache key.
    fn collection(&self) -> &str;

    /// All records, most recently created first.
    async fn select_all(&self) -> Result<Vec<NodeRecord>, StoreError>;

    async fn insert(&self, node: &NewNode) -> Result<NodeRecord, StoreError>;

    /// Fails with [`StoreError::NotFound`] when no record has `id`.
    async fn update_by_id(&self, id: Uuid, update: &NodeUpdate) -> Result<NodeRecord, StoreError>;
}
