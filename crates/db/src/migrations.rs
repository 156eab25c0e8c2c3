//! Schema auto-migration.
//!
//! Tables are created when missing and columns are added when a record
//! definition gains one. Existing columns are never altered or dropped.

use crate::config::Dialect;
use crate::error::DbError;
use crate::models::{Node, Record, Server, User};
use sqlx::AnyPool;
use tracing::{debug, info};

/// Storage type of a non-key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `VARCHAR(n) NOT NULL DEFAULT ''`
    Varchar(u16),
    /// `BIGINT NOT NULL DEFAULT d`
    BigInt(i64),
}

/// A column of a record's table, excluding the `id` primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub unique: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            unique: false,
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    /// Column definition without constraints that `ADD COLUMN` cannot carry.
    fn definition(&self) -> String {
        match self.kind {
            ColumnKind::Varchar(size) => {
                format!("{} VARCHAR({}) NOT NULL DEFAULT ''", self.name, size)
            }
            ColumnKind::BigInt(default) => {
                format!("{} BIGINT NOT NULL DEFAULT {}", self.name, default)
            }
        }
    }
}

fn primary_key(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySql => "id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY",
        Dialect::Postgres => "id BIGSERIAL PRIMARY KEY",
        Dialect::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement for a record type.
pub fn create_table_sql<R: Record>(dialect: Dialect) -> String {
    let mut parts = vec![primary_key(dialect).to_string()];
    for column in R::COLUMNS {
        let mut definition = column.definition();
        if column.unique {
            definition.push_str(" UNIQUE");
        }
        parts.push(definition);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        R::TABLE,
        parts.join(", ")
    )
}

/// `ALTER TABLE ... ADD COLUMN` statement for one column of a record type.
pub fn add_column_sql<R: Record>(column: &Column) -> String {
    format!("ALTER TABLE {} ADD COLUMN {}", R::TABLE, column.definition())
}

/// Bring the table of one record type in line with its definition.
pub async fn auto_migrate<R: Record>(pool: &AnyPool, dialect: Dialect) -> Result<(), DbError> {
    sqlx::query(&create_table_sql::<R>(dialect))
        .execute(pool)
        .await?;

    for column in R::COLUMNS {
        let probe = format!("SELECT {} FROM {} WHERE 1 = 0", column.name, R::TABLE);
        if sqlx::query(&probe).fetch_optional(pool).await.is_ok() {
            continue;
        }

        sqlx::query(&add_column_sql::<R>(column))
            .execute(pool)
            .await?;
        info!("Added column {}.{}", R::TABLE, column.name);
    }

    debug!("Table {} is up to date", R::TABLE);
    Ok(())
}

/// Migrate every panel record type: nodes, servers, then users.
pub async fn run(pool: &AnyPool, dialect: Dialect) -> Result<(), DbError> {
    auto_migrate::<Node>(pool, dialect).await?;
    auto_migrate::<Server>(pool, dialect).await?;
    auto_migrate::<User>(pool, dialect).await?;
    Ok(())
}
