use serde::{Deserialize, Serialize};

/// A cookie as stored/serialized by the session jar.
///
/// This structure captures the essential attributes of an HTTP cookie and
/// is suitable for persistence (e.g., JSON over a session store) via `serde`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping (e.g., `"/"`). Derived from the request URL when the
    /// `Path` attribute is absent.
    pub path: Option<String>,

    /// Domain scoping (host-only if `None`). When present, should be a registrable domain
    /// or subdomain (e.g., `"example.com"`).
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// Expiration timestamp, if any. Stored as received; session cookies have `None`.
    pub expires: Option<String>,

    /// SameSite policy (`"Strict"`, `"Lax"`, or `"None"`).
    pub same_site: Option<String>,

    /// If `true`, cookie is flagged as inaccessible to client-side scripts.
    pub http_only: bool,
}

impl Cookie {
    /// A bare `name=value` cookie with no attributes set.
    pub fn named(name: &str, value: &str) -> Self {
        Cookie {
            name: name.to_string(),
            value: value.to_string(),
            path: None,
            domain: None,
            secure: false,
            expires: None,
            same_site: None,
            http_only: false,
        }
    }

    /// Formats the cookie as a `name=value` request header pair.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}
