use serde::{Serialize, Deserialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::models::status::NodeStatusReport;

pub const DEFAULT_STATUS: &str = "offline";
pub const DEFAULT_UPTIME: &str = "0d 0h 0m";

/// A node row as stored in the registry collection.
///
/// `status` and `uptime` are free-form strings; the store enforces nothing
/// beyond the column types.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: Uuid,
    pub address: String,
    pub status: String,
    pub block_height: i64,
    #[sqlx(rename = "peers")]
    #[serde(rename = "peers")]
    pub peer_count: i64,
    pub uptime: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NodeRecord {
    pub fn state(&self) -> Option<NodeState> {
        self.status.parse().ok()
    }
}

/// Insert payload. `id`, `created_at` and `updated_at` are assigned by the store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewNode {
    pub address: String,
    pub status: String,
    pub block_height: i64,
    #[serde(rename = "peers")]
    pub peer_count: i64,
    pub uptime: String,
}

impl NewNode {
    /// The values a freshly added node starts with before it is ever polled.
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: DEFAULT_STATUS.to_string(),
            block_height: 0,
            peer_count: 0,
            uptime: DEFAULT_UPTIME.to_string(),
        }
    }
}

/// Partial update. Only `Some` fields are sent to the store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<i64>,
    #[serde(rename = "peers", skip_serializing_if = "Option::is_none")]
    pub peer_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
}

impl NodeUpdate {
    pub fn address(address: impl Into<String>) -> Self {
        Self { address: Some(address.into()), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.status.is_none()
            && self.block_height.is_none()
            && self.peer_count.is_none()
            && self.uptime.is_none()
    }

    /// Applies the supplied fields onto `record`, leaving the rest untouched.
    pub fn apply_to(&self, record: &mut NodeRecord) {
        if let Some(address) = &self.address {
            record.address = address.clone();
        }
        if let Some(status) = &self.status {
            record.status = status.clone();
        }
        if let Some(block_height) = self.block_height {
            record.block_height = block_height;
        }
        if let Some(peer_count) = self.peer_count {
            record.peer_count = peer_count;
        }
        if let Some(uptime) = &self.uptime {
            record.uptime = uptime.clone();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Online,
    Offline,
    Syncing,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Online => "online",
            NodeState::Offline => "offline",
            NodeState::Syncing => "syncing",
        }
    }

    /// Reads a health state off a live report.
    ///
    /// Offline when the aggregation failed or nothing at all came back,
    /// online once the node reports both a height and peers, syncing in between.
    pub fn infer(report: &NodeStatusReport) -> Self {
        if !report.success {
            return NodeState::Offline;
        }
        if report.height == 0 && report.peer_count == 0 && report.raw_info.is_none() {
            return NodeState::Offline;
        }
        if report.height > 0 && report.peer_count > 0 {
            NodeState::Online
        } else {
            NodeState::Syncing
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(NodeState::Online),
            "offline" => Ok(NodeState::Offline),
            "syncing" => Ok(NodeState::Syncing),
            other => Err(format!("unknown node status '{}'", other)),
        }
    }
}
