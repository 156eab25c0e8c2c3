//! Integration tests for the node service.

use async_trait::async_trait;
use pufferpanel_db::{ConnectionProvider, Database, DatabaseConfig, DbError, Loader, Node};
use pufferpanel_services::NodeService;
use std::sync::Arc;

async fn service() -> NodeService {
    let loader = Loader::new(DatabaseConfig::new("sqlite", ":memory:"));
    loader.load().await.unwrap();
    NodeService::from_provider(&loader).await.unwrap()
}

struct UnavailableProvider;

#[async_trait]
impl ConnectionProvider for UnavailableProvider {
    async fn connection(&self) -> Result<Arc<Database>, DbError> {
        Err(DbError::NotConnected)
    }
}

#[tokio::test]
async fn from_provider_surfaces_connection_error() {
    let result = NodeService::from_provider(&UnavailableProvider).await;
    assert!(matches!(result, Err(DbError::NotConnected)));
}

#[tokio::test]
async fn services_share_the_loader_handle() {
    let loader = Loader::new(DatabaseConfig::new("sqlite", ":memory:"));
    loader.load().await.unwrap();

    let writer = NodeService::from_provider(&loader).await.unwrap();
    let reader = NodeService::from_provider(&loader).await.unwrap();

    let node = writer.create(Node::new("shared", "10.0.0.9")).await.unwrap();
    assert_eq!(reader.get(node.id).await.unwrap(), Some(node));
}

#[tokio::test]
async fn create_then_get_returns_node() {
    let nodes = service().await;

    let created = nodes
        .create(Node {
            secret: "0b4c1d2e".into(),
            ..Node::new("node-1", "192.168.1.10")
        })
        .await
        .unwrap();
    assert_ne!(created.id, 0);

    let found = nodes.get(created.id).await.unwrap();
    assert_eq!(found, Some(created));
}

#[tokio::test]
async fn get_missing_node_is_none() {
    let nodes = service().await;
    assert_eq!(nodes.get(42).await.unwrap(), None);
}

#[tokio::test]
async fn get_all_lists_nodes_in_id_order() {
    let nodes = service().await;
    assert!(nodes.get_all().await.unwrap().is_empty());

    let first = nodes.create(Node::new("alpha", "10.0.0.1")).await.unwrap();
    let second = nodes.create(Node::new("beta", "10.0.0.2")).await.unwrap();

    assert_eq!(nodes.get_all().await.unwrap(), vec![first, second]);
}

#[tokio::test]
async fn update_overwrites_stored_node() {
    let nodes = service().await;
    let mut node = nodes.create(Node::new("node-1", "10.0.0.1")).await.unwrap();

    node.public_host = "node1.example.com".into();
    node.sftp_port = 2022;
    nodes.update(&node).await.unwrap();

    assert_eq!(nodes.get(node.id).await.unwrap(), Some(node));
}

#[tokio::test]
async fn update_missing_node_changes_nothing() {
    let nodes = service().await;
    let existing = nodes.create(Node::new("node-1", "10.0.0.1")).await.unwrap();

    let ghost = Node {
        id: existing.id + 100,
        ..Node::new("ghost", "10.0.0.66")
    };
    nodes.update(&ghost).await.unwrap();

    assert_eq!(nodes.get(ghost.id).await.unwrap(), None);
    assert_eq!(nodes.get_all().await.unwrap(), vec![existing]);
}

#[tokio::test]
async fn delete_then_get_is_none() {
    let nodes = service().await;
    let keep = nodes.create(Node::new("keep", "10.0.0.1")).await.unwrap();
    let gone = nodes.create(Node::new("drop", "10.0.0.2")).await.unwrap();

    nodes.delete(gone.id).await.unwrap();

    assert_eq!(nodes.get(gone.id).await.unwrap(), None);
    assert_eq!(nodes.get_all().await.unwrap(), vec![keep]);
}

#[tokio::test]
async fn delete_missing_node_is_not_an_error() {
    let nodes = service().await;
    nodes.delete(7).await.unwrap();
}

#[tokio::test]
async fn duplicate_node_name_surfaces_driver_error() {
    let nodes = service().await;
    nodes.create(Node::new("node-1", "10.0.0.1")).await.unwrap();

    let err = nodes
        .create(Node::new("node-1", "10.0.0.2"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Sqlx(_)));
}
