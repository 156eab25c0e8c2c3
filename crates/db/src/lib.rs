//! Database layer for PufferPanel.
//!
//! Opens a single shared connection handle over the sqlx `Any` driver and
//! keeps the node, server and user tables in line with their record
//! definitions.

pub mod config;
pub mod error;
pub mod loader;
pub mod migrations;
pub mod models;
pub mod pool;

pub use config::{DatabaseConfig, Dialect};
pub use error::DbError;
pub use loader::{ConnectionProvider, Loader};
pub use models::{Node, Record, Server, User, Value};
pub use pool::Database;
