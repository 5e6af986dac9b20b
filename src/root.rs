//! The root!
//!
//! The most important part of atmzr, the actual redirect logic

use axum::Extension;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::Html;

use crate::api::Token;
use crate::api::link_id;
use crate::config::HostPrefix;
use crate::storage::Storage;

/// Landing page
const INDEX: &str = include_str!("../templates/index.html");

/// Serve the landing page
pub async fn index() -> Html<&'static str> {
    Html(INDEX)
}

/// The root!
///
/// Every token ends up here. The link is looked up and a view is recorded, after that the
/// request is redirected with `303 See Other`.
///
/// This never fails: an unknown token or a storage problem redirects to the host root
pub async fn redirect<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(host): Extension<HostPrefix>,
    Token(token): Token,
) -> (StatusCode, HeaderMap) {
    let id = link_id(&token);

    tracing::debug!(r#"Looking for token "{token}" (link {id})"#);

    let url = match storage.resolve_link(id).await {
        Ok(Some(url)) => {
            tracing::debug!("Link {id} redirecting to: {url}");

            Some(url)
        }
        Ok(None) => {
            tracing::debug!("Link {id} not found");

            None
        }
        Err(err) => {
            tracing::warn!("Could not resolve link {id}, redirecting to root: {err}");

            None
        }
    };

    // every request is a view, found or not
    if let Err(err) = storage.record_view(id).await {
        tracing::warn!("Could not record view of link {id}: {err}");
    }

    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location(url.as_deref(), &host));

    (StatusCode::SEE_OTHER, headers)
}

/// Location header for the redirect
///
/// Falls back to the host root when there is no URL or it is not a valid header
fn location(url: Option<&str>, host: &HostPrefix) -> HeaderValue {
    url.and_then(|url| HeaderValue::from_str(url).ok())
        .or_else(|| HeaderValue::from_str(host.root()).ok())
        .unwrap_or_else(|| HeaderValue::from_static("/"))
}
