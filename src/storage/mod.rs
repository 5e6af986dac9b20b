//! All things related to the storage of links and their views

use async_trait::async_trait;
use thiserror::Error;

pub use memory::Memory;
pub use postgres::Postgres;

mod memory;
mod postgres;

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// The storage could not run a statement
    #[error("Query error: {0}")]
    Query(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Storage with all supported operations
///
/// Every call stands on its own, nothing is shared between two calls (no transaction)
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Create a link for the URL, returns the new ID
    async fn create_link(&self, url: &str) -> Result<u64>;

    /// Find the URL of a link
    ///
    /// An unknown ID is `Ok(None)`, not an error
    async fn resolve_link(&self, id: u64) -> Result<Option<String>>;

    /// Save a view on a link
    ///
    /// The ID is not checked, views for unknown links are accepted
    async fn record_view(&self, id: u64) -> Result<()>;

    /// Count all views of a link, `0` for unknown links
    async fn count_views(&self, id: u64) -> Result<u64>;
}
