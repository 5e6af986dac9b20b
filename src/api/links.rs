//! Links API endpoints
//!
//! Creating short links and looking at their view counts

use axum::Extension;

use crate::codec;
use crate::config::HostPrefix;
use crate::storage::Storage;

use super::Error;
use super::PostForm;
use super::Success;
use super::Token;
use super::link_id;
use super::parse_url;

/// Shortest token the statistics will look at
const MIN_TOKEN_LENGTH: usize = 4;

/// Create a short link
///
/// The URL is stored as posted, the first `url` field wins
///
/// Request:
/// ```sh
/// curl -v -d 'url=https://www.example.com/' http://localhost:8080/createLink
/// curl -v -F 'url=https://www.example.com/' http://localhost:8080/createLink
/// ```
///
/// Response:
/// ```json
/// { "status": "success", "data": "http://localhost:8080/AQ==" }
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(host): Extension<HostPrefix>,
    form: PostForm,
) -> Result<Success, Error> {
    let url = form.value("url").unwrap_or_default();

    if url.is_empty() {
        return Err(Error::no_link());
    }

    parse_url(url)?;

    let id = storage.create_link(url).await.map_err(|err| {
        tracing::error!("Could not create link to {url}: {err}");

        Error::create_failed()
    })?;

    let token = codec::encode(id);

    tracing::debug!(r#"Created link {id} to {url} as "{token}""#);

    Ok(Success::ok(host.short_link(&token)))
}

/// Count the views of a short link
///
/// Request:
/// ```sh
/// curl -v http://localhost:8080/linkStatistics/AQ==
/// ```
///
/// Response:
/// ```json
/// { "status": "success", "data": "3" }
/// ```
pub async fn statistics<S: Storage>(
    Extension(storage): Extension<S>,
    Token(token): Token,
) -> Result<Success, Error> {
    if token.chars().count() < MIN_TOKEN_LENGTH {
        return Err(Error::invalid_hash());
    }

    let id = link_id(&token);

    let count = storage.count_views(id).await.map_err(|err| {
        tracing::error!("Could not count views of link {id}: {err}");

        Error::message(err)
    })?;

    Ok(Success::ok(count))
}

/// Statistics without a hash in the path
pub async fn statistics_without_hash() -> Error {
    Error::missing_hash()
}
