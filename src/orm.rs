//! Minimal async ORM for Cardápio (sqlite + sqlx)
//!
//! Usage:
//! let db = Db::connect("sqlite::memory:").await?;
//! Dish::create_table(&db).await?;
//! let mut session = db.session().await?;
//! let dishes = Dish::all(&mut session).await?;
use log::{debug, info};
use sqlx::pool::PoolConnection;
pub use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::time::Instant;

use crate::settings::DatabaseSettings;

/// An async database pool wrapper.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

/// A table-backed record type.
///
/// Implementors describe their columns; the table itself is created on demand
/// and never altered afterwards.
#[async_trait::async_trait]
pub trait Model: Send + Sync {
    fn table_name() -> &'static str;

    /// `(name, sql type and constraints)` pairs, in declaration order.
    fn columns() -> Vec<(&'static str, &'static str)>;

    /// Columns that get a secondary index.
    fn indexes() -> Vec<&'static str> {
        Vec::new()
    }

    fn create_table_sql() -> String {
        let columns: Vec<String> = Self::columns()
            .into_iter()
            .map(|(name, sqltype)| format!("{} {}", name, sqltype))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            Self::table_name(),
            columns.join(", ")
        )
    }

    /// Create the table and its indexes if they don't exist yet.
    async fn create_table(db: &Db) -> Result<(), sqlx::Error> {
        let table_name = Self::table_name();
        db.execute(&Self::create_table_sql()).await?;
        for column in Self::indexes() {
            db.execute(&format!(
                "CREATE INDEX IF NOT EXISTS ix_{table}_{column} ON {table} ({column})",
                table = table_name,
                column = column
            ))
            .await?;
        }
        info!("Table `{}` is ready.", table_name);
        Ok(())
    }
}

impl Db {
    /// Connect (or create) a SQLite database at the given URI
    pub async fn connect(uri: &str) -> Result<Self, sqlx::Error> {
        Self::connect_with(&DatabaseSettings {
            url: uri.to_string(),
            ..DatabaseSettings::default()
        })
        .await
    }

    /// Connect using the pool limits from `settings`. A missing database file is created.
    pub async fn connect_with(settings: &DatabaseSettings) -> Result<Self, sqlx::Error> {
        info!("Connecting to SQLite database at URI: {}", settings.url);
        let options = SqliteConnectOptions::from_str(&settings.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await?;
        info!("Connected to SQLite database: {}", settings.url);
        Ok(Db { pool })
    }

    /// Execute an arbitrary SQL statement, e.g. DDL, INSERT, UPDATE.
    pub async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
        debug!("Executing SQL: {}", sql);
        let result = self.pool.execute(sql).await;
        match &result {
            Ok(_) => debug!("SQL executed successfully"),
            Err(e) => log::error!("SQL execution failed: {}", e),
        }
        result.map(|_| ())
    }

    /// Fetch all rows and map to a type implementing `FromRow`.
    pub async fn fetch_all<T: for<'r> FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin>(
        &self,
        sql: &str,
    ) -> Result<Vec<T>, sqlx::Error> {
        debug!("Fetching rows with SQL: {}", sql);
        let result = sqlx::query_as(sql).fetch_all(&self.pool).await;
        match &result {
            Ok(rows) => debug!("Fetched {} rows successfully", rows.len()),
            Err(e) => log::error!("Row fetch failed: {}", e),
        }
        result
    }

    /// Open a session holding one pooled connection until it is dropped.
    pub async fn session(&self) -> Result<Session, sqlx::Error> {
        let conn = self.pool.acquire().await?;
        debug!("Session opened");
        Ok(Session {
            conn,
            opened_at: Instant::now(),
        })
    }
}

/// A scoped database session.
///
/// Derefs to the underlying connection, so it can be passed wherever a
/// `&mut SqliteConnection` is expected. The connection goes back to the pool
/// when the session is dropped, on every exit path.
pub struct Session {
    conn: PoolConnection<Sqlite>,
    opened_at: Instant,
}

impl Deref for Session {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        &self.conn
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("Session released after {:?}", self.opened_at.elapsed());
    }
}
