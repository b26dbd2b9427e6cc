//! Client for the managed store's REST interface (PostgREST dialect).

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{NodeStore, NODES_TABLE};
use crate::error::StoreError;
use crate::models::{NewNode, NodeRecord, NodeUpdate};

/// Where the store lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    pub table: String,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            table: NODES_TABLE.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct StoreErrorBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    config: StoreConfig,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: StoreConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), self.config.table)
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, self.endpoint())
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StoreErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(text);
        Err(StoreError::Rejected { status: status.as_u16(), message })
    }

    async fn rows(response: Response) -> Result<Vec<NodeRecord>, StoreError> {
        let response = Self::check(response).await?;
        response
            .json::<Vec<NodeRecord>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl NodeStore for RestStore {
    fn collection(&self) -> &str {
        &self.config.table
    }

    async fn select_all(&self) -> Result<Vec<NodeRecord>, StoreError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        let records = Self::rows(response).await?;
        debug!("Fetched {} rows from {}", records.len(), self.config.table);
        Ok(records)
    }

    async fn insert(&self, node: &NewNode) -> Result<NodeRecord, StoreError> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(node)
            .send()
            .await?;
        let record = Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))?;
        info!("Inserted node {} ({})", record.id, record.address);
        Ok(record)
    }

    async fn update_by_id(&self, id: Uuid, update: &NodeUpdate) -> Result<NodeRecord, StoreError> {
        let response = self
            .request(Method::PATCH)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await?;
        let record = Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound { id })?;
        info!("Updated node {}", record.id);
        Ok(record)
    }
}
