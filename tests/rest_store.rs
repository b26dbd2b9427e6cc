use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use pokt_node_dashboard::cache::MemoryCache;
use pokt_node_dashboard::db::{NodeStore, RestStore, StoreConfig};
use pokt_node_dashboard::models::{NewNode, NodeUpdate};
use pokt_node_dashboard::services::NodeRegistry;
use pokt_node_dashboard::StoreError;

const API_KEY: &str = "public-anon-key";

fn store(server: &MockServer) -> RestStore {
    RestStore::new(StoreConfig::new(server.base_url(), API_KEY))
}

fn row(id: Uuid, address: &str) -> serde_json::Value {
    json!({
        "id": id,
        "address": address,
        "status": "offline",
        "block_height": 0,
        "peers": 0,
        "uptime": "0d 0h 0m",
        "created_at": "2025-03-01T12:00:00.123456+00:00",
        "updated_at": "2025-03-01T12:00:00.123456+00:00"
    })
}

#[tokio::test]
async fn select_orders_by_creation_desc() {
    let server = MockServer::start();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/nodes")
            .query_param("select", "*")
            .query_param("order", "created_at.desc")
            .header("apikey", API_KEY)
            .header("authorization", format!("Bearer {}", API_KEY));
        then.status(200).json_body(json!([row(a, "10.0.0.2"), row(b, "10.0.0.1")]));
    });

    let records = store(&server).select_all().await.unwrap();

    mock.assert();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, a);
    assert_eq!(records[0].address, "10.0.0.2");
    assert_eq!(records[1].peer_count, 0);
}

#[tokio::test]
async fn insert_returns_store_assigned_row() {
    let server = MockServer::start();
    let id = Uuid::new_v4();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/nodes")
            .header("prefer", "return=representation")
            .json_body(json!({
                "address": "1.2.3.4",
                "status": "offline",
                "block_height": 0,
                "peers": 0,
                "uptime": "0d 0h 0m"
            }));
        then.status(201).json_body(json!([row(id, "1.2.3.4")]));
    });

    let record = store(&server).insert(&NewNode::with_address("1.2.3.4")).await.unwrap();

    mock.assert();
    assert_eq!(record.id, id);
    assert_eq!(record.address, "1.2.3.4");
}

#[tokio::test]
async fn patch_sends_only_supplied_fields() {
    let server = MockServer::start();
    let id = Uuid::new_v4();
    let mock = server.mock(|when, then| {
        when.method(Method::PATCH)
            .path("/rest/v1/nodes")
            .query_param("id", format!("eq.{}", id))
            .json_body(json!({"address": "5.6.7.8"}));
        then.status(200).json_body(json!([row(id, "5.6.7.8")]));
    });

    let record = store(&server)
        .update_by_id(id, &NodeUpdate::address("5.6.7.8"))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(record.address, "5.6.7.8");
    assert_eq!(record.status, "offline");
}

#[tokio::test]
async fn patch_matching_no_row_is_not_found() {
    let server = MockServer::start();
    let id = Uuid::new_v4();
    server.mock(|when, then| {
        when.method(Method::PATCH).path("/rest/v1/nodes");
        then.status(200).json_body(json!([]));
    });

    let err = store(&server)
        .update_by_id(id, &NodeUpdate::address("5.6.7.8"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { id: missing } if missing == id));
}

#[tokio::test]
async fn rejection_is_propagated_with_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/rest/v1/nodes");
        then.status(409).json_body(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"nodes_address_key\""
        }));
    });

    let err = store(&server)
        .insert(&NewNode::with_address("1.2.3.4"))
        .await
        .unwrap_err();

    match err {
        StoreError::Rejected { status, message } => {
            assert_eq!(status, 409);
            assert!(message.contains("duplicate key"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn registry_refetches_after_insert() {
    let server = MockServer::start();
    let id = Uuid::new_v4();
    let mut select = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/nodes");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/rest/v1/nodes");
        then.status(201).json_body(json!([row(id, "1.2.3.4")]));
    });

    let registry = NodeRegistry::new(Arc::new(store(&server)), Arc::new(MemoryCache::new()));
    assert!(registry.list_nodes().await.unwrap().is_empty());
    assert!(registry.list_nodes().await.unwrap().is_empty());
    assert_eq!(select.calls(), 1);

    registry.create_node(&NewNode::with_address("1.2.3.4")).await.unwrap();
    select.delete();
    let select = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/nodes");
        then.status(200).json_body(json!([row(id, "1.2.3.4")]));
    });

    let nodes = registry.list_nodes().await.unwrap();
    assert_eq!(select.calls(), 1);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, id);
}

#[tokio::test]
async fn store_failure_on_list_is_propagated() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/nodes");
        then.status(401).json_body(json!({"message": "Invalid API key"}));
    });

    let registry = NodeRegistry::new(Arc::new(store(&server)), Arc::new(MemoryCache::new()));
    let err = registry.list_nodes().await.unwrap_err();

    assert!(matches!(err, StoreError::Rejected { status: 401, .. }));
}
