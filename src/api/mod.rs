//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;

pub use request::PostForm;
pub use request::Token;
pub use request::link_id;
pub use request::parse_url;
pub use response::Error;
pub use response::Success;

use crate::storage::Storage;

mod links;
mod request;
mod response;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    Router::new()
        .route("/createLink", post(links::create::<S>))
        .route("/linkStatistics", get(links::statistics_without_hash))
        .route("/linkStatistics/", get(links::statistics::<S>))
        .route("/linkStatistics/{token}", get(links::statistics::<S>))
}
