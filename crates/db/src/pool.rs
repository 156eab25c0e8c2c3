//! Database connection handle and record queries.

use crate::config::{DatabaseConfig, Dialect};
use crate::error::DbError;
use crate::migrations;
use crate::models::{Record, Value};
use sqlx::any::{AnyArguments, AnyPoolOptions};
use sqlx::query::{Query, QueryScalar};
use sqlx::{Any, AnyPool};
use tracing::{debug, info};

/// Database connection handle.
///
/// Wraps the driver pool together with the dialect it was opened with, so
/// statements can be rendered with the right placeholders.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
    dialect: Dialect,
}

impl Database {
    /// Open a connection for the configured dialect and URL.
    ///
    /// Driver errors (bad URL, unreachable host, bad credentials) are returned
    /// as-is.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DbError> {
        let dialect = config.dialect()?;
        let url = config.connection_url(dialect)?;

        sqlx::any::install_default_drivers();

        let mut options = AnyPoolOptions::new().max_connections(config.max_connections.max(1));
        if url.contains(":memory:") {
            // Every in-memory connection is a separate database.
            options = options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = options.connect(&url).await?;

        info!(dialect = %dialect, "Connected to database");

        Ok(Self { pool, dialect })
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Create or alter the node, server and user tables.
    pub async fn migrate(&self) -> Result<(), DbError> {
        info!("Running database migrations");
        migrations::run(&self.pool, self.dialect).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Close every connection of the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!(dialect = %self.dialect, "Closed database connection");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Fetch every row of a record's table, ordered by id.
    pub async fn find_all<R: Record>(&self) -> Result<Vec<R>, DbError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", select_list::<R>(), R::TABLE);
        let rows = sqlx::query_as::<_, R>(&sql).fetch_all(&self.pool).await?;
        debug!(table = R::TABLE, count = rows.len(), "Fetched rows");
        Ok(rows)
    }

    /// Fetch the row with the given id, if any.
    pub async fn first<R: Record>(&self, id: i64) -> Result<Option<R>, DbError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = {}",
            select_list::<R>(),
            R::TABLE,
            self.dialect.placeholder(1)
        );
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        debug!(table = R::TABLE, id, found = row.is_some(), "Fetched row");
        Ok(row)
    }

    /// Insert a record, ignoring its id, and return the id the database assigned.
    ///
    /// Only the MySQL driver reports the insert id through the query result;
    /// the other dialects read it back with `RETURNING id`.
    pub async fn insert<R: Record>(&self, record: &R) -> Result<i64, DbError> {
        let columns: Vec<&str> = R::COLUMNS.iter().map(|column| column.name).collect();
        let placeholders: Vec<String> = (1..=columns.len())
            .map(|index| self.dialect.placeholder(index))
            .collect();
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            columns.join(", "),
            placeholders.join(", ")
        );

        let id = if self.dialect != Dialect::MySql {
            sql.push_str(" RETURNING id");
            let mut query = sqlx::query_scalar::<_, i64>(&sql);
            for value in record.values() {
                query = bind_scalar(query, value);
            }
            query.fetch_one(&self.pool).await?
        } else {
            let mut query = sqlx::query(&sql);
            for value in record.values() {
                query = bind(query, value);
            }
            let result = query.execute(&self.pool).await?;
            result
                .last_insert_id()
                .ok_or_else(|| sqlx::Error::Protocol("driver returned no insert id".into()))?
        };

        debug!(table = R::TABLE, id, "Inserted row");
        Ok(id)
    }

    /// Update every column of the row with the record's id.
    ///
    /// Returns the number of rows affected; a missing id affects none and is
    /// not an error.
    pub async fn update<R: Record>(&self, record: &R) -> Result<u64, DbError> {
        let assignments: Vec<String> = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| {
                format!("{} = {}", column.name, self.dialect.placeholder(index + 1))
            })
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = {}",
            R::TABLE,
            assignments.join(", "),
            self.dialect.placeholder(R::COLUMNS.len() + 1)
        );

        let mut query = sqlx::query(&sql);
        for value in record.values() {
            query = bind(query, value);
        }
        let result = query.bind(record.id()).execute(&self.pool).await?;

        debug!(
            table = R::TABLE,
            id = record.id(),
            rows_affected = result.rows_affected(),
            "Updated row"
        );
        Ok(result.rows_affected())
    }

    /// Delete the row with the given id. Returns the number of rows affected.
    pub async fn delete<R: Record>(&self, id: i64) -> Result<u64, DbError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = {}",
            R::TABLE,
            self.dialect.placeholder(1)
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        debug!(
            table = R::TABLE,
            id,
            rows_affected = result.rows_affected(),
            "Deleted row"
        );
        Ok(result.rows_affected())
    }
}

fn select_list<R: Record>() -> String {
    std::iter::once("id")
        .chain(R::COLUMNS.iter().map(|column| column.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bind<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    value: Value,
) -> Query<'q, Any, AnyArguments<'q>> {
    match value {
        Value::BigInt(v) => query.bind(v),
        Value::Text(v) => query.bind(v),
    }
}

fn bind_scalar<'q>(
    query: QueryScalar<'q, Any, i64, AnyArguments<'q>>,
    value: Value,
) -> QueryScalar<'q, Any, i64, AnyArguments<'q>> {
    match value {
        Value::BigInt(v) => query.bind(v),
        Value::Text(v) => query.bind(v),
    }
}
