use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NodeRecord, NodeState, NodeStatusReport, NodeUpdate};
use crate::services::node_status::NodeStatusAggregator;
use crate::services::registry::NodeRegistry;

#[derive(Serialize, Debug, Clone)]
pub struct SyncOutcome {
    pub report: NodeStatusReport,
    pub record: NodeRecord,
}

/// Status fields to write for a fresh report. Height and peers are only
/// written when the node answered something; an offline reading keeps the
/// last known metrics.
pub fn update_from_report(report: &NodeStatusReport) -> NodeUpdate {
    let state = NodeState::infer(report);
    let mut update = NodeUpdate {
        status: Some(state.to_string()),
        ..Default::default()
    };
    if state != NodeState::Offline {
        update.block_height = Some(i64::try_from(report.height).unwrap_or(i64::MAX));
        update.peer_count = Some(i64::try_from(report.peer_count).unwrap_or(i64::MAX));
    }
    update
}

/// Polls `node_url` and records the result on node `id`.
pub async fn sync_node(
    registry: &NodeRegistry,
    aggregator: &NodeStatusAggregator,
    id: Uuid,
    node_url: &str,
) -> Result<SyncOutcome, StoreError> {
    let report = aggregator.get_node_status(node_url).await;
    let update = update_from_report(&report);
    let record = registry.update_node(id, &update).await?;
    info!("Synced node {}: {} at height {}", record.id, record.status, record.block_height);
    Ok(SyncOutcome { report, record })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_report_only_marks_offline() {
        let update = update_from_report(&NodeStatusReport::failed("boom"));
        assert_eq!(update.status.as_deref(), Some("offline"));
        assert_eq!(update.block_height, None);
        assert_eq!(update.peer_count, None);
    }

    #[test]
    fn unreachable_node_keeps_last_metrics() {
        let update = update_from_report(&NodeStatusReport::collected(0, 0, None));
        assert_eq!(update.status.as_deref(), Some("offline"));
        assert_eq!(update.block_height, None);
        assert_eq!(update.peer_count, None);
    }

    #[test]
    fn syncing_node_writes_partial_metrics() {
        let update = update_from_report(&NodeStatusReport::collected(310, 0, None));
        assert_eq!(update.status.as_deref(), Some("syncing"));
        assert_eq!(update.block_height, Some(310));
        assert_eq!(update.peer_count, Some(0));
    }

    #[test]
    fn collected_report_writes_metrics() {
        let update = update_from_report(&NodeStatusReport::collected(900, 12, None));
        assert_eq!(update.status.as_deref(), Some("online"));
        assert_eq!(update.block_height, Some(900));
        assert_eq!(update.peer_count, Some(12));
        assert_eq!(update.address, None);
    }
}
