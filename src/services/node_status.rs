//! Live status of a single node, folded from three independent RPC reads.

use log::{debug, error, warn};
use serde_json::Value;
use url::Url;

use crate::error::FetchError;
use crate::models::NodeStatusReport;

pub const HEIGHT_PATH: &str = "/v1/query/height";
pub const PEERS_PATH: &str = "/v1/query/peers";
pub const NODE_INFO_PATH: &str = "/v1/query/node";

#[derive(Debug, thiserror::Error)]
enum AggregateError {
    #[error("invalid node URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Clone, Default)]
pub struct NodeStatusAggregator {
    client: reqwest::Client,
}

impl NodeStatusAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Queries height, peers and node info on `node_url` and merges them.
    ///
    /// A failing sub-query only zeroes its own field. The report is marked
    /// unsuccessful when the aggregation cannot run at all.
    pub async fn get_node_status(&self, node_url: &str) -> NodeStatusReport {
        match self.collect(node_url).await {
            Ok(report) => report,
            Err(e) => {
                error!("Status aggregation for {} failed: {}", node_url, e);
                NodeStatusReport::failed(e.to_string())
            }
        }
    }

    async fn collect(&self, node_url: &str) -> Result<NodeStatusReport, AggregateError> {
        Url::parse(node_url)?;
        let base = node_url.trim_end_matches('/');

        let (height, peers, info) = futures::join!(
            self.fetch_json(base, HEIGHT_PATH),
            self.fetch_json(base, PEERS_PATH),
            self.fetch_json(base, NODE_INFO_PATH),
        );

        Ok(NodeStatusReport::collected(
            fold_height(&height),
            fold_peer_count(&peers),
            fold_node_info(info),
        ))
    }

    async fn fetch_json(&self, base: &str, path: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", base, path);
        let result = self.request_json(&url).await;
        match &result {
            Ok(_) => debug!("GET {} ok", url),
            Err(e) => warn!("GET {} degraded to default: {}", url, e),
        }
        result
    }

    async fn request_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        // a 2xx body that is not JSON degrades this sub-query only; it does
        // not fail the whole report
        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// `height` field of the height response; 0 when missing or the read failed.
pub fn fold_height(result: &Result<Value, FetchError>) -> u64 {
    let Ok(body) = result else { return 0 };
    match body.get("height") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Length of the `peers` array; 0 when missing or the read failed.
pub fn fold_peer_count(result: &Result<Value, FetchError>) -> u64 {
    result
        .as_ref()
        .ok()
        .and_then(|body| body.get("peers"))
        .and_then(Value::as_array)
        .map(|peers| peers.len() as u64)
        .unwrap_or(0)
}

pub fn fold_node_info(result: Result<Value, FetchError>) -> Option<Value> {
    match result {
        Ok(Value::Null) | Err(_) => None,
        Ok(body) => Some(body),
    }
}
