//! API request helpers

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use mime::Mime;
use url::Url;
use url::form_urlencoded;

use crate::codec;

use super::Error;

/// ID used for tokens that do not decode
///
/// No link has this ID, so lookups find nothing and views are counted on the side
pub const UNKNOWN_LINK_ID: u64 = 0;

/// Parse and validate a URL
///
/// Only absolute URLs are accepted
pub fn parse_url<I>(url: I) -> Result<Url, Error>
where
    I: AsRef<str>,
{
    Url::parse(url.as_ref()).map_err(|_| Error::invalid_url())
}

/// Find the link ID of a token
///
/// Tokens that do not decode are not an error, they get [`UNKNOWN_LINK_ID`]
pub fn link_id(token: &str) -> u64 {
    codec::decode(token).unwrap_or_else(|err| {
        tracing::debug!(r#"Token "{token}" does not decode ({err}), using ID {UNKNOWN_LINK_ID}"#);

        UNKNOWN_LINK_ID
    })
}

/// Values of a posted form, in order of the body
///
/// Both `application/x-www-form-urlencoded` and `multipart/form-data` bodies are read. Any other
/// body, or no content type at all, is an empty form. Only a body that claims to be a form and
/// can not be read is the parse error.
#[derive(Debug, Default)]
pub struct PostForm(Vec<(String, String)>);

impl PostForm {
    /// First value of a field
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl<S> FromRequest<S> for PostForm
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Some(content_type) = req.headers().get(CONTENT_TYPE) else {
            return Ok(Self::default());
        };

        let content_type = content_type
            .to_str()
            .ok()
            .and_then(|content_type| content_type.parse::<Mime>().ok())
            .ok_or_else(|| parse_error("Invalid content type"))?;

        let is_type = |type_: mime::Name<'static>, subtype: mime::Name<'static>| {
            content_type.type_() == type_ && content_type.subtype() == subtype
        };

        if is_type(mime::APPLICATION, mime::WWW_FORM_URLENCODED) {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(parse_error)?;

            if !is_well_escaped(&body) {
                return Err(parse_error("Invalid escape in form"));
            }

            return Ok(Self(form_urlencoded::parse(&body).into_owned().collect()));
        }

        if is_type(mime::MULTIPART, mime::FORM_DATA) {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(parse_error)?;

            let mut values = Vec::new();

            while let Some(field) = multipart.next_field().await.map_err(parse_error)? {
                // uploads are not form values
                if field.file_name().is_some() {
                    continue;
                }

                let Some(name) = field.name().map(ToString::to_string) else {
                    continue;
                };

                values.push((name, field.text().await.map_err(parse_error)?));
            }

            return Ok(Self(values));
        }

        Ok(Self::default())
    }
}

fn parse_error<E>(err: E) -> Error
where
    E: std::fmt::Display,
{
    tracing::debug!("Could not extract form: {err}");

    Error::parse()
}

/// Every `%` starts an escape of two hex digits
fn is_well_escaped(body: &[u8]) -> bool {
    body.iter()
        .enumerate()
        .filter(|(_, byte)| **byte == b'%')
        .all(|(index, _)| {
            body.get(index + 1..index + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        })
}

/// The token in the path
///
/// A path that can not be read (invalid UTF-8) gives an empty token
pub struct Token(pub String);

impl<S> FromRequestParts<S> for Token
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = Path::<String>::from_request_parts(parts, state)
            .await
            .map_or_else(
                |err| {
                    tracing::debug!("Could not extract token: {err}");

                    String::new()
                },
                |Path(token)| token,
            );

        Ok(Self(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://www.example.com").is_ok());
        assert!(parse_url("http://www.google.com/search?q=atmzr").is_ok());
    }

    #[test]
    fn test_parse_url_requires_absolute_url() {
        assert!(parse_url("http//www.google.com").is_err());
        assert!(parse_url("/relative/path").is_err());
        assert!(parse_url("www.google.com").is_err());
    }

    #[test]
    fn test_post_form_value() {
        let form = PostForm(vec![
            ("url".to_string(), "http://www.google.com".to_string()),
            ("other".to_string(), "value".to_string()),
            ("url".to_string(), "http://www.example.com".to_string()),
        ]);

        assert_eq!(Some("http://www.google.com"), form.value("url"));
        assert_eq!(None, form.value("missing"));
    }

    #[test]
    fn test_is_well_escaped() {
        assert!(is_well_escaped(b"url=http%3A%2F%2Fwww.google.com"));
        assert!(is_well_escaped(b"url=a+b"));
        assert!(is_well_escaped(b""));

        assert!(!is_well_escaped(b"url=%zz"));
        assert!(!is_well_escaped(b"url=%4"));
        assert!(!is_well_escaped(b"url=100%"));
    }

    #[test]
    fn test_link_id() {
        assert_eq!(73, link_id("SQ=="));
        assert_eq!(UNKNOWN_LINK_ID, link_id("not a token"));
        assert_eq!(UNKNOWN_LINK_ID, link_id(""));
    }
}
