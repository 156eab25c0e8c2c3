//! Node lookups and edits.

use pufferpanel_db::{ConnectionProvider, Database, DbError, Node};
use std::sync::Arc;
use tracing::debug;

/// Node service.
///
/// Each call issues a single statement against the shared handle. There is no
/// validation, caching or transaction scoping at this layer.
#[derive(Clone)]
pub struct NodeService {
    db: Arc<Database>,
}

impl NodeService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Build a service on the provider's shared connection.
    pub async fn from_provider(provider: &dyn ConnectionProvider) -> Result<Self, DbError> {
        let db = provider.connection().await?;
        Ok(Self::new(db))
    }

    /// All nodes, ordered by id.
    pub async fn get_all(&self) -> Result<Vec<Node>, DbError> {
        self.db.find_all::<Node>().await
    }

    /// The node with the given id, or `None` when no row matches.
    pub async fn get(&self, id: i64) -> Result<Option<Node>, DbError> {
        self.db.first::<Node>(id).await
    }

    /// Insert a node and return it with its assigned id.
    ///
    /// The id carried by `node` is ignored.
    pub async fn create(&self, node: Node) -> Result<Node, DbError> {
        let id = self.db.insert(&node).await?;
        Ok(Node { id, ..node })
    }

    /// Overwrite the stored node with the same id.
    ///
    /// Nothing checks that the node exists; a missing id changes no rows.
    pub async fn update(&self, node: &Node) -> Result<(), DbError> {
        let rows = self.db.update(node).await?;
        if rows == 0 {
            debug!(id = node.id, "Update matched no node");
        }
        Ok(())
    }

    /// Delete the node with the given id. A missing id is not an error.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        self.db.delete::<Node>(id).await?;
        Ok(())
    }
}
