#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::router;
use crate::config::Config;
use crate::config::DatabaseConfig;
use crate::config::HostPrefix;
use crate::storage::Memory;
use crate::storage::Postgres;
use crate::storage::Storage;

mod api;
mod codec;
mod config;
mod graceful_shutdown;
mod links;
mod root;
mod storage;
#[cfg(test)]
mod tests;
mod utils;

const DEFAULT_RUST_LOG: &str = "atmzr=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;
    let address = config.address;

    let app = setup_app(config).await?;

    let listener = TcpListener::bind(address).await?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if the database can not be used
pub async fn setup_app(config: Config) -> Result<Router> {
    let Config { host, database, .. } = config;

    let app = match database {
        DatabaseConfig::Memory => create_router(Memory::new(), host),
        database => create_router(Postgres::from_config(database).await?, host),
    };

    Ok(app)
}

/// Create the router for atmzr
fn create_router<S: Storage>(storage: S, host: HostPrefix) -> Router {
    Router::new()
        .route("/", get(root::index))
        .route("/{token}", get(root::redirect::<S>))
        .merge(router::<S>())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(storage))
        .layer(Extension(host))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}
