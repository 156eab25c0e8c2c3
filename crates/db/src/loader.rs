//! Shared connection loader.
//!
//! A [`Loader`] is built once at startup from the database config and handed
//! to services through [`ConnectionProvider`]. It holds at most one open
//! [`Database`] at a time.

use crate::config::DatabaseConfig;
use crate::error::DbError;
use crate::pool::Database;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Source of the shared database handle.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn connection(&self) -> Result<Arc<Database>, DbError>;
}

/// Owns the shared database handle for one configuration.
///
/// The dialect and URL are fixed at construction; build a new loader to
/// connect somewhere else.
pub struct Loader {
    config: DatabaseConfig,
    conn: Mutex<Option<Arc<Database>>>,
}

impl Loader {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
        }
    }

    /// Open a fresh connection, migrate the schema and make it the shared
    /// handle.
    ///
    /// A previously open handle is closed once the new one is in place. On
    /// failure the stored handle is left as it was.
    pub async fn load(&self) -> Result<Arc<Database>, DbError> {
        let mut slot = self.conn.lock().await;

        let db = Database::open(&self.config).await?;
        if let Err(err) = db.migrate().await {
            db.close().await;
            return Err(err);
        }

        let db = Arc::new(db);
        if let Some(previous) = slot.replace(db.clone()) {
            debug!("Replacing previously open database handle");
            previous.close().await;
        }

        info!(dialect = %db.dialect(), "Database loaded");
        Ok(db)
    }

    /// Return the shared handle, opening it if none is open yet.
    ///
    /// Opening here does not migrate. A failed open stores nothing.
    pub async fn get_connection(&self) -> Result<Arc<Database>, DbError> {
        let mut slot = self.conn.lock().await;
        if let Some(db) = slot.as_ref() {
            return Ok(db.clone());
        }

        let db = Arc::new(Database::open(&self.config).await?);
        *slot = Some(db.clone());
        Ok(db)
    }

    /// Close the shared handle.
    ///
    /// Fails with [`DbError::NotConnected`] when nothing is open.
    pub async fn close(&self) -> Result<(), DbError> {
        let db = self.conn.lock().await.take();
        match db {
            Some(db) => {
                db.close().await;
                Ok(())
            }
            None => {
                warn!("Close requested with no open database connection");
                Err(DbError::NotConnected)
            }
        }
    }

    pub async fn is_open(&self) -> bool {
        self.conn.lock().await.is_some()
    }
}

#[async_trait]
impl ConnectionProvider for Loader {
    async fn connection(&self) -> Result<Arc<Database>, DbError> {
        self.get_connection().await
    }
}
