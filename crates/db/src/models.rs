//! Database models and types.

use crate::migrations::{Column, ColumnKind};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::FromRow;

/// Port the panel daemon listens on when a node does not say otherwise.
pub const DEFAULT_DAEMON_PORT: i64 = 5656;

/// SFTP port exposed by a node daemon by default.
pub const DEFAULT_SFTP_PORT: i64 = 5657;

/// A value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    BigInt(i64),
    Text(String),
}

/// A persisted record type.
///
/// Every record has an auto-increment `id` primary key, which is not part of
/// [`Record::COLUMNS`]. `values` returns one entry per column, in the same
/// order.
pub trait Record: for<'r> FromRow<'r, AnyRow> + Send + Unpin {
    const TABLE: &'static str;
    const COLUMNS: &'static [Column];

    fn id(&self) -> i64;

    fn values(&self) -> Vec<Value>;
}

/// A machine running the panel daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Node {
    pub id: i64,
    pub name: String,
    pub public_host: String,
    pub private_host: String,
    pub public_port: i64,
    pub private_port: i64,
    pub sftp_port: i64,
    pub secret: String,
}

impl Node {
    /// A node with the default daemon and SFTP ports.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            name: name.into(),
            public_host: host.clone(),
            private_host: host,
            public_port: DEFAULT_DAEMON_PORT,
            private_port: DEFAULT_DAEMON_PORT,
            sftp_port: DEFAULT_SFTP_PORT,
            ..Self::default()
        }
    }
}

impl Record for Node {
    const TABLE: &'static str = "nodes";
    const COLUMNS: &'static [Column] = &[
        Column::new("name", ColumnKind::Varchar(100)).unique(),
        Column::new("public_host", ColumnKind::Varchar(100)),
        Column::new("private_host", ColumnKind::Varchar(100)),
        Column::new("public_port", ColumnKind::BigInt(DEFAULT_DAEMON_PORT)),
        Column::new("private_port", ColumnKind::BigInt(DEFAULT_DAEMON_PORT)),
        Column::new("sftp_port", ColumnKind::BigInt(DEFAULT_SFTP_PORT)),
        Column::new("secret", ColumnKind::Varchar(36)),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.public_host.clone()),
            Value::Text(self.private_host.clone()),
            Value::BigInt(self.public_port),
            Value::BigInt(self.private_port),
            Value::BigInt(self.sftp_port),
            Value::Text(self.secret.clone()),
        ]
    }
}

/// A game server hosted on a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Server {
    pub id: i64,
    pub name: String,
    pub identifier: String,
    pub node_id: i64,
}

impl Record for Server {
    const TABLE: &'static str = "servers";
    const COLUMNS: &'static [Column] = &[
        Column::new("name", ColumnKind::Varchar(20)),
        Column::new("identifier", ColumnKind::Varchar(36)).unique(),
        Column::new("node_id", ColumnKind::BigInt(0)),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.identifier.clone()),
            Value::BigInt(self.node_id),
        ]
    }
}

/// A panel account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
}

impl Record for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [Column] = &[
        Column::new("username", ColumnKind::Varchar(100)).unique(),
        Column::new("email", ColumnKind::Varchar(255)).unique(),
        Column::new("hashed_password", ColumnKind::Varchar(200)),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.username.clone()),
            Value::Text(self.email.clone()),
            Value::Text(self.hashed_password.clone()),
        ]
    }
}
