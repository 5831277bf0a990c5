use http::{HeaderMap, Method};

/// What a session should request: a bare URL (or path), or a structured
/// request description.
///
/// Every request entry point accepts `impl Into<RequestTarget>`, and the
/// target is coerced into a canonical [`RequestOptions`] once at the call
/// boundary.
#[derive(Debug, Clone)]
pub enum RequestTarget {
    /// A URL or path string; all other options take their defaults.
    Url(String),
    /// A full request description.
    Options(RequestOptions),
}

impl RequestTarget {
    pub(crate) fn into_options(self) -> RequestOptions {
        match self {
            RequestTarget::Url(uri) => RequestOptions {
                uri,
                ..RequestOptions::default()
            },
            RequestTarget::Options(options) => options,
        }
    }
}

impl From<&str> for RequestTarget {
    fn from(uri: &str) -> Self {
        RequestTarget::Url(uri.to_string())
    }
}

impl From<String> for RequestTarget {
    fn from(uri: String) -> Self {
        RequestTarget::Url(uri)
    }
}

impl From<RequestOptions> for RequestTarget {
    fn from(options: RequestOptions) -> Self {
        RequestTarget::Options(options)
    }
}

/// A structured request description.
///
/// `body`, `form`, and the `json` flag are alternative encodings of the
/// outgoing payload: `form` wins over `body` when both are set, and `json`
/// only affects headers and response handling, not the payload itself.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,

    /// Absolute URL, or a path resolved against the session's host.
    pub uri: String,

    /// Extra headers for every hop of the request.
    pub headers: HeaderMap,

    /// Raw request body bytes.
    pub body: Option<Vec<u8>>,

    /// URL-encoded form payload (sets the form content type).
    pub form: Option<Vec<(String, String)>>,

    /// Query string pairs appended to the URL.
    pub query: Option<Vec<(String, String)>>,

    /// Marks the exchange as JSON: a JSON content type is attached on the
    /// way out, and the flag survives redirects.
    pub json: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            uri: String::new(),
            headers: HeaderMap::new(),
            body: None,
            form: None,
            query: None,
            json: false,
        }
    }
}

impl RequestOptions {
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Options for the next hop of a redirect: headers and the `json` flag
    /// carry forward, the method resets to GET, and payload fields drop.
    pub(crate) fn follow(&self) -> Self {
        Self {
            method: Method::GET,
            uri: String::new(),
            headers: self.headers.clone(),
            body: None,
            form: None,
            query: None,
            json: self.json,
        }
    }
}
