use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::LOCATION;
use http_body_util::BodyExt;
use tower::Service;
use url::form_urlencoded;

use crate::config::HostPrefix;
use crate::create_router;
use crate::storage;
use crate::storage::Memory;
use crate::storage::Storage;

/// Host prefix used by every test app
pub const HOST: &str = "http://localhost:8080/";

/// Storage double
///
/// Keeps everything in memory, counts the recorded views and can act like the database is down
#[derive(Clone, Default)]
pub struct Spy {
    memory: Memory,
    is_failing: bool,
    record_view_calls: Arc<AtomicUsize>,
}

impl Spy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a connection error
    pub fn failing() -> Self {
        Self {
            is_failing: true,
            ..Self::default()
        }
    }

    /// Number of `record_view` calls, failed ones included
    pub fn record_view_calls(&self) -> usize {
        self.record_view_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> storage::Result<()> {
        if self.is_failing {
            Err(storage::Error::Connection("database is down".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Storage for Spy {
    async fn create_link(&self, url: &str) -> storage::Result<u64> {
        self.check()?;
        self.memory.create_link(url).await
    }

    async fn resolve_link(&self, id: u64) -> storage::Result<Option<String>> {
        self.check()?;
        self.memory.resolve_link(id).await
    }

    async fn record_view(&self, id: u64) -> storage::Result<()> {
        self.record_view_calls.fetch_add(1, Ordering::SeqCst);

        self.check()?;
        self.memory.record_view(id).await
    }

    async fn count_views(&self, id: u64) -> storage::Result<u64> {
        self.check()?;
        self.memory.count_views(id).await
    }
}

/// Setup the atmzr app around the given storage
pub fn setup_test_app<S: Storage>(storage: S) -> Router {
    create_router(storage, HostPrefix::new(HOST))
}

pub async fn index(app: &mut Router) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, String::from_utf8_lossy(&body[..]).to_string())
}

pub async fn create_link(app: &mut Router, url: &str) -> (StatusCode, String) {
    let body = form_urlencoded::Serializer::new(String::new())
        .append_pair("url", url)
        .finish();

    create_link_with_raw_body(
        app,
        &body,
        Some(mime::APPLICATION_WWW_FORM_URLENCODED.as_ref()),
    )
    .await
}

/// Multipart body with a single text field, separated by [`BOUNDARY`]
pub fn multipart_body(name: &str, value: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    )
}

/// Boundary of [`multipart_body`]
pub const BOUNDARY: &str = "atmzr-boundary";

pub async fn create_link_with_raw_body(
    app: &mut Router,
    body: &str,
    content_type: Option<&str>,
) -> (StatusCode, String) {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri("/createLink");

    if let Some(content_type) = content_type {
        request = request.header(CONTENT_TYPE, content_type);
    }

    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, String::from_utf8_lossy(&body[..]).to_string())
}

pub async fn redirect(app: &mut Router, token: &str) -> (StatusCode, Option<String>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/{token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();

    let status_code = response.status();
    let location = response
        .headers()
        .get(LOCATION)
        .map(|header| header.to_str().unwrap().to_string());

    (status_code, location)
}

pub async fn statistics(app: &mut Router, path: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/linkStatistics{path}"))
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, String::from_utf8_lossy(&body[..]).to_string())
}

/// The JSON envelope as the API serves it, `data` can not contain characters JSON escapes
pub fn envelope(status: &str, data: &str) -> String {
    format!(r#"{{"status":"{status}","data":"{data}"}}"#)
}
