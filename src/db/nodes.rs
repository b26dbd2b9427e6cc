use async_trait::async_trait;
use log::info;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::db::{NodeStore, NODES_TABLE};
use crate::error::StoreError;
use crate::models::{NewNode, NodeRecord, NodeUpdate};

const NODE_COLUMNS: &str = "id, address, status, block_height, peers, uptime, created_at, updated_at";

/// Direct Postgres access to the same `nodes` table the REST store exposes.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = Pool::<Postgres>::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                address TEXT NOT NULL,
                status TEXT NOT NULL,
                block_height BIGINT NOT NULL DEFAULT 0,
                peers BIGINT NOT NULL DEFAULT 0,
                uptime TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl NodeStore for PgStore {
    fn collection(&self) -> &str {
        NODES_TABLE
    }

    async fn select_all(&self) -> Result<Vec<NodeRecord>, StoreError> {
        let records = sqlx::query_as::<_, NodeRecord>(&format!(
            "SELECT {} FROM nodes ORDER BY created_at DESC",
            NODE_COLUMNS
        ))
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn insert(&self, node: &NewNode) -> Result<NodeRecord, StoreError> {
        let record = sqlx::query_as::<_, NodeRecord>(&format!(
            r#"
            INSERT INTO nodes (address, status, block_height, peers, uptime)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            NODE_COLUMNS
        ))
            .bind(&node.address)
            .bind(&node.status)
            .bind(node.block_height)
            .bind(node.peer_count)
            .bind(&node.uptime)
            .fetch_one(&self.pool)
            .await?;
        info!("Inserted node {} ({})", record.id, record.address);
        Ok(record)
    }

    async fn update_by_id(&self, id: Uuid, update: &NodeUpdate) -> Result<NodeRecord, StoreError> {
        let record = sqlx::query_as::<_, NodeRecord>(&format!(
            r#"
            UPDATE nodes
            SET address = COALESCE($2, address),
                status = COALESCE($3, status),
                block_height = COALESCE($4, block_height),
                peers = COALESCE($5, peers),
                uptime = COALESCE($6, uptime),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            NODE_COLUMNS
        ))
            .bind(id)
            .bind(update.address.as_deref())
            .bind(update.status.as_deref())
            .bind(update.block_height)
            .bind(update.peer_count)
            .bind(update.uptime.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { id })?;
        info!("Updated node {}", record.id);
        Ok(record)
    }
}
