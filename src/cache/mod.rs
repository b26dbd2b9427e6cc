use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::CacheError;
use crate::models::NodeRecord;

pub const DEFAULT_TTL_SECS: u64 = 60;

/// Cached `list` results, keyed by collection name.
#[async_trait]
pub trait ListCache: Send + Sync {
    async fn get(&self, collection: &str) -> Result<Option<Vec<NodeRecord>>, CacheError>;

    async fn put(&self, collection: &str, records: &[NodeRecord]) -> Result<(), CacheError>;

    /// Drops the entry so the next read goes to the store. Idempotent.
    async fn invalidate(&self, collection: &str) -> Result<(), CacheError>;
}

#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<NodeRecord>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListCache for MemoryCache {
    async fn get(&self, collection: &str) -> Result<Option<Vec<NodeRecord>>, CacheError> {
        Ok(self.entries.read().await.get(collection).cloned())
    }

    async fn put(&self, collection: &str, records: &[NodeRecord]) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(collection.to_string(), records.to_vec());
        Ok(())
    }

    async fn invalidate(&self, collection: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(collection);
        Ok(())
    }
}

/// Shared cache in Redis. Entries expire after `ttl_secs` even if an
/// invalidation is lost.
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
    ttl_secs: u64,
}

impl RedisCache {
    pub fn new(url: &str, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = Client::open(url)?;
        Ok(RedisCache { client, ttl_secs })
    }

    async fn get_conn(&self) -> Result<MultiplexedConnection, CacheError> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    fn key(collection: &str) -> String {
        format!("registry:{}", collection)
    }
}

#[async_trait]
impl ListCache for RedisCache {
    async fn get(&self, collection: &str) -> Result<Option<Vec<NodeRecord>>, CacheError> {
        let mut conn = self.get_conn().await?;
        let data: Option<String> = conn.get(Self::key(collection)).await?;
        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, collection: &str, records: &[NodeRecord]) -> Result<(), CacheError> {
        let mut conn = self.get_conn().await?;
        let json = serde_json::to_string(records)?;
        let _: () = conn.set_ex(Self::key(collection), json, self.ttl_secs).await?;
        Ok(())
    }

    async fn invalidate(&self, collection: &str) -> Result<(), CacheError> {
        let mut conn = self.get_conn().await?;
        let _: () = conn.del(Self::key(collection)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(address: &str) -> NodeRecord {
        let now = Utc::now();
        NodeRecord {
            id: Uuid::new_v4(),
            address: address.to_string(),
            status: "offline".to_string(),
            block_height: 0,
            peer_count: 0,
            uptime: "0d 0h 0m".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn entries_are_keyed_by_collection() {
        let cache = MemoryCache::new();
        cache.put("nodes", &[record("1.2.3.4")]).await.unwrap();
        assert_eq!(cache.get("nodes").await.unwrap().unwrap().len(), 1);
        assert!(cache.get("others").await.unwrap().is_none());

        cache.invalidate("others").await.unwrap();
        assert!(cache.get("nodes").await.unwrap().is_some());

        cache.invalidate("nodes").await.unwrap();
        cache.invalidate("nodes").await.unwrap();
        assert!(cache.get("nodes").await.unwrap().is_none());
    }
}
