use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};

/// Aggregated view of one node, built fresh for every status request.
///
/// `success` only says the aggregation ran. A node that answered none of
/// the sub-queries still yields `success: true` with zeroed metrics.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatusReport {
    pub success: bool,
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub peer_count: u64,
    #[serde(default)]
    pub raw_info: Option<Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl NodeStatusReport {
    pub fn collected(height: u64, peer_count: u64, raw_info: Option<Value>) -> Self {
        Self {
            success: true,
            height,
            peer_count,
            raw_info,
            timestamp: Utc::now(),
            error_message: None,
        }
    }

    /// The report returned when aggregation itself blew up. Carries no metrics.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            height: 0,
            peer_count: 0,
            raw_info: None,
            timestamp: Utc::now(),
            error_message: Some(message.into()),
        }
    }
}

// failed reports go out without metric fields
impl Serialize for NodeStatusReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.success {
            let mut state = serializer.serialize_struct("NodeStatusReport", 6)?;
            state.serialize_field("success", &true)?;
            state.serialize_field("height", &self.height)?;
            state.serialize_field("peerCount", &self.peer_count)?;
            state.serialize_field("rawInfo", &self.raw_info)?;
            state.serialize_field("timestamp", &self.timestamp)?;
            state.serialize_field("errorMessage", &self.error_message)?;
            state.end()
        } else {
            let mut state = serializer.serialize_struct("NodeStatusReport", 3)?;
            state.serialize_field("success", &false)?;
            state.serialize_field("errorMessage", &self.error_message)?;
            state.serialize_field("timestamp", &self.timestamp)?;
            state.end()
        }
    }
}
