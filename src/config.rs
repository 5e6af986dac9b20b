//! Configuration
//!
//! Read once from the environment on startup and handed to the parts that need it:
//!
//! - `ADDRESS`: address to listen on, defaults to `0.0.0.0:8080`
//! - `PORT`: override of just the port of `ADDRESS`
//! - `HOST_URI`: public prefix of every short link, defaults to `/`
//! - `DATABASE_URL`: Postgres connection string, links are kept in memory when not set
//! - `DATABASE_MAX_CONNECTIONS`: size of the connection pool, defaults to `5`
//! - `DATABASE_ACQUIRE_TIMEOUT`: seconds to wait for a connection, defaults to `3`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use sqlx::PgPool;

use crate::utils::env_var;
use crate::utils::env_var_or_else;

const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_HOST: &str = "/";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT: u64 = 3;

/// Application configuration
pub struct Config {
    /// Address to listen on
    pub address: SocketAddr,

    /// Prefix for short links
    pub host: HostPrefix,

    /// Where the links are kept
    pub database: DatabaseConfig,
}

/// Database configuration
pub enum DatabaseConfig {
    /// No database, links live in memory
    Memory,

    /// Connect to Postgres
    Connect {
        /// Connection string
        url: String,

        /// Size of the pool
        max_connections: u32,

        /// Deadline to get a connection for a single storage call
        acquire_timeout: Duration,
    },

    /// Use existing connection
    ExistingConnection(PgPool),
}

impl Config {
    /// Detect configuration from environment
    ///
    /// # Errors
    ///
    /// Will return `Err` if any of the set variables can not be parsed
    pub fn from_env() -> Result<Self> {
        let address = setup_address()?;

        let host = env_var_or_else("HOST_URI", || {
            tracing::warn!("`HOST_URI` is not set, short links will be relative to `{DEFAULT_HOST}`");
            String::from(DEFAULT_HOST)
        });

        let database = match env_var("DATABASE_URL") {
            Some(url) => DatabaseConfig::Connect {
                url,
                max_connections: parse_env_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
                acquire_timeout: Duration::from_secs(
                    parse_env_var("DATABASE_ACQUIRE_TIMEOUT")?.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT),
                ),
            },
            None => {
                tracing::warn!("`DATABASE_URL` is not set, links are kept in memory");
                DatabaseConfig::Memory
            }
        };

        Ok(Self {
            address,
            host: HostPrefix::new(host),
            database,
        })
    }
}

/// Public prefix of short links
///
/// Also the place a redirect goes to when there is nothing else to go to
#[derive(Clone, Debug)]
pub struct HostPrefix(Arc<str>);

impl HostPrefix {
    /// Create a prefix, an empty one is the root path
    pub fn new<H>(host: H) -> Self
    where
        H: AsRef<str>,
    {
        let host = host.as_ref();

        if host.is_empty() {
            Self(Arc::from(DEFAULT_HOST))
        } else {
            Self(Arc::from(host))
        }
    }

    /// The full short link of a token
    pub fn short_link(&self, token: &str) -> String {
        format!("{}{token}", self.0)
    }

    /// The home page, fallback for redirects
    pub fn root(&self) -> &str {
        &self.0
    }
}

fn setup_address() -> Result<SocketAddr> {
    let mut address = env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS))
        .parse::<SocketAddr>()
        .context("Invalid `ADDRESS`")?;

    // optional override of just the port
    if let Some(port) = parse_env_var::<u16>("PORT")? {
        address.set_port(port);
    }

    Ok(address)
}

/// Parse an optional ENV var
fn parse_env_var<T>(var_name: &'static str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_var(var_name)
        .map(|value| value.parse::<T>())
        .transpose()
        .with_context(|| format!("Invalid `{var_name}`"))
}
