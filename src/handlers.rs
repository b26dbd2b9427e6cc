//! Entry points reachable from outside the crate. Input is validated here,
//! before any network call is made.

use serde::Deserialize;
use url::Url;

use crate::error::ValidationError;
use crate::models::NodeStatusReport;
use crate::services::NodeStatusAggregator;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfoInput {
    pub node_url: String,
}

pub fn validate_node_url(input: &str) -> Result<Url, ValidationError> {
    Url::parse(input).map_err(|e| ValidationError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Live status for one node. Rejects a malformed `nodeUrl` without
/// touching the network.
pub async fn node_info(
    aggregator: &NodeStatusAggregator,
    input: NodeInfoInput,
) -> Result<NodeStatusReport, ValidationError> {
    validate_node_url(&input.node_url)?;
    Ok(aggregator.get_node_status(&input.node_url).await)
}
