//! Postgres-backed storage session.
//!
//! The keyspace is a schema in the target database. It is put on the
//! connection `search_path`, so every statement names the `categories` table
//! unqualified.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;
use uuid::Uuid;

use super::{CategoryTable, StoreResult};
use crate::config::StoreConfig;
use crate::model::Category;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS categories (
    id_category UUID PRIMARY KEY,
    name TEXT NOT NULL
)";

/// Failure to establish the session. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid keyspace name '{0}'")]
    InvalidKeyspace(String),
    #[error("failed to connect to store at {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: sqlx::Error,
    },
    #[error("keyspace '{0}' does not exist")]
    MissingKeyspace(String),
    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Long-lived, pooled connection context shared by every request.
#[derive(Clone, Debug)]
pub struct Session {
    pool: PgPool,
    keyspace: String,
}

impl Session {
    /// Connect with the configured credentials and bind to the keyspace.
    ///
    /// There is no reconnect logic; a session that cannot be opened is a
    /// startup failure.
    pub async fn open(config: &StoreConfig) -> Result<Self, SessionError> {
        let keyspace = normalize_keyspace(&config.keyspace)?;

        // Log connection info without password
        info!(
            host = %config.host,
            port = config.port,
            keyspace = %keyspace,
            username = %config.username,
            "Opening storage session"
        );

        let mut opts = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(config.password.expose())
            .options([("search_path", keyspace.as_str())]);

        if let Some(timeout_ms) = config.statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{}ms", timeout_ms))]);
            info!("statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_with(opts)
            .await
            .map_err(|source| SessionError::Connect {
                host: config.host.clone(),
                port: config.port,
                source,
            })?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1)",
        )
        .bind(&keyspace)
        .fetch_one(&pool)
        .await?;
        if !exists {
            return Err(SessionError::MissingKeyspace(keyspace));
        }

        info!(keyspace = %keyspace, "Storage session established");
        Ok(Self { pool, keyspace })
    }

    /// Create the `categories` table if it is not there yet.
    pub async fn ensure_table(&self) -> Result<(), SessionError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        info!(keyspace = %self.keyspace, "categories table ready");
        Ok(())
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }
}

#[async_trait]
impl CategoryTable for Session {
    async fn scan(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT id_category, name FROM categories")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn lookup(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            "SELECT id_category, name FROM categories WHERE id_category = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn contains(&self, id: Uuid) -> StoreResult<bool> {
        let found: Option<Uuid> =
            sqlx::query_scalar("SELECT id_category FROM categories WHERE id_category = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn insert(&self, name: &str) -> StoreResult<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO categories (id_category, name) VALUES (gen_random_uuid(), $1) RETURNING id_category",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: Uuid, name: &str) -> StoreResult<()> {
        sqlx::query("UPDATE categories SET name = $1 WHERE id_category = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM categories WHERE id_category = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Folds the keyspace the way Postgres folds an unquoted `search_path` entry,
/// so the existence check looks at the schema the session will actually use.
fn normalize_keyspace(name: &str) -> Result<String, SessionError> {
    if !is_valid_keyspace(name) {
        return Err(SessionError::InvalidKeyspace(name.to_string()));
    }
    Ok(name.to_ascii_lowercase())
}

/// Plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_valid_keyspace(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
