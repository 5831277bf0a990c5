//! Buffered HTTP response model.
//!
//! [`Response`] represents a **fully buffered** HTTP response as received at
//! one hop: URL, status code + reason, headers, and the raw body bytes. The
//! session engine follows redirects itself, so the `url` field is the URL of
//! the hop that produced this response, and a 3xx response exposes its
//! target through [`Response::redirect_location`].
//!
//! The body is stored as raw `Vec<u8>`; use [`Response::text`] for lossy
//! text or [`Response::json`] to deserialize.

use std::borrow::Cow;

use http::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

/// Simple structure for HTTP responses.
///
/// All fields reflect the **received** response as-is; no additional parsing
/// or transformation is performed by this type.
#[derive(Debug)]
pub struct Response {
    /// URL of the hop that produced this response.
    pub url: Url,

    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    ///
    /// May be `"Unknown"` for non-standard codes.
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// Body as text (lossy UTF-8).
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// `true` when this response redirects (3xx status with a `Location` header).
    pub fn is_redirect(&self) -> bool {
        self.redirect_location().is_some()
    }

    /// The `Location` this response redirects to, when it is a 3xx redirect.
    pub fn redirect_location(&self) -> Option<&str> {
        if !(300..400).contains(&self.status) {
            return None;
        }
        self.headers.get(http::header::LOCATION)?.to_str().ok()
    }
}

/// A [`Response`] paired with its body parsed as JSON, returned by the
/// `request_json` entry points.
#[derive(Debug)]
pub struct JsonResponse {
    /// The terminal response of the exchange.
    pub response: Response,

    /// The body, parsed as JSON.
    pub json: serde_json::Value,
}
