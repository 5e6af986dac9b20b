//! Postgres storage

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::config::DatabaseConfig;

use super::Error;
use super::Result;
use super::Storage;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage from the database part of the config
    ///
    /// Migrations will be run
    ///
    /// # Errors
    ///
    /// Will return `Err` when there is no database to connect to or the migrations fail
    pub async fn from_config(config: DatabaseConfig) -> Result<Self> {
        match config {
            DatabaseConfig::Connect {
                url,
                max_connections,
                acquire_timeout,
            } => {
                let connection_pool = PgPoolOptions::new()
                    .max_connections(max_connections)
                    .acquire_timeout(acquire_timeout)
                    .connect(&url)
                    .await
                    .map_err(connection_error)?;

                Self::new_with_pool(connection_pool).await
            }
            DatabaseConfig::ExistingConnection(connection_pool) => {
                Self::new_with_pool(connection_pool).await
            }
            DatabaseConfig::Memory => Err(Error::Connection(
                "No database configured, set `DATABASE_URL`".to_string(),
            )),
        }
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Connection(format!("Migrations could not run: {err}")))?;

        Ok(Self { connection_pool })
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn create_link(&self, url: &str) -> Result<u64> {
        let id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO links (url)
            VALUES ($1)
            RETURNING id
            ",
        )
        .bind(url)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(query_error)?;

        u64::try_from(id).map_err(|_| Error::Query(format!("Invalid link ID: {id}")))
    }

    async fn resolve_link(&self, id: u64) -> Result<Option<String>> {
        // IDs beyond the column range can not exist
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };

        let url = sqlx::query_scalar::<_, String>(
            r"
            SELECT url
            FROM links
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(query_error)?;

        Ok(url)
    }

    async fn record_view(&self, id: u64) -> Result<()> {
        let id = i64::try_from(id).map_err(|_| Error::Query(format!("Invalid link ID: {id}")))?;

        sqlx::query(
            r"
            INSERT INTO link_statistics (link_id)
            VALUES ($1)
            ",
        )
        .bind(id)
        .execute(&self.connection_pool)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn count_views(&self, id: u64) -> Result<u64> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(0);
        };

        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM link_statistics
            WHERE link_id = $1
            ",
        )
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(query_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}

/// Convert `SQLx` error of a statement to a storage error
///
/// Failing to reach the database is still a connection error
fn query_error(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => connection_error(err),
        err => Error::Query(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = false)]
    #[ignore = "needs a Postgres database in `DATABASE_URL`"]
    async fn test_postgres_links_and_views(pool: PgPool) {
        let storage = Postgres::from_config(DatabaseConfig::ExistingConnection(pool))
            .await
            .unwrap();

        let id = storage.create_link("https://www.example.com/").await.unwrap();

        assert_eq!(
            Some("https://www.example.com/".to_string()),
            storage.resolve_link(id).await.unwrap()
        );
        assert_eq!(None, storage.resolve_link(id + 1).await.unwrap());

        assert_eq!(0, storage.count_views(id).await.unwrap());

        storage.record_view(id).await.unwrap();
        storage.record_view(id).await.unwrap();
        storage.record_view(id + 1).await.unwrap();

        assert_eq!(2, storage.count_views(id).await.unwrap());
        assert_eq!(1, storage.count_views(id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_config_is_not_a_database() {
        let result = Postgres::from_config(DatabaseConfig::Memory).await;

        assert!(matches!(result, Err(Error::Connection(_))));
    }
}
