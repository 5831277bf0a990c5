//! The per-session cookie jar.
//!
//! A [`SessionJar`] holds every cookie one session has accumulated. The
//! request engine passes response metadata to the jar so it can update
//! itself, and asks it for the `Cookie` header to attach to each outgoing
//! request.
//!
//! Parsing covers a subset of RFC 6265 `Set-Cookie` semantics: `Path`,
//! `Domain` (leading dot stripped), `Expires` (stored as raw string),
//! `SameSite`, `Secure`, and `HttpOnly` are handled; expiration is stored
//! but not enforced. Cookies are bucketed by **origin**
//! (`url.origin().ascii_serialization()`); request matching applies
//! host/subdomain, path-prefix, and `Secure` checks across buckets.
//!
//! The jar serializes losslessly with `serde`, which is what makes session
//! export/import and store persistence round-trip exactly.

use std::collections::HashMap;

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cookies::Cookie;

/// All cookies belonging to a single session, bucketed by origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionJar {
    /// Key: origin string from `Url::origin().ascii_serialization()`.
    /// Value: vector of cookie records set under that origin.
    entries: HashMap<String, Vec<Cookie>>,
}

impl SessionJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every `Set-Cookie` header in `headers` and stores the results
    /// under `url`'s origin, using last-write-wins semantics when names
    /// collide. Returns the number of cookies consumed.
    pub fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) -> usize {
        let origin = url.origin().ascii_serialization();
        let default_path = default_path_for(url);
        let mut stored = 0;

        for header in headers.get_all(http::header::SET_COOKIE) {
            let Ok(header_str) = header.to_str() else {
                continue;
            };
            let Some(cookie) = parse_set_cookie(header_str, &default_path) else {
                continue;
            };

            self.insert(origin.clone(), cookie);
            stored += 1;
        }

        stored
    }

    /// Returns the `Cookie` request header value to send for `url`, or `None`
    /// if no stored cookie applies.
    ///
    /// A cookie applies when its domain matches the request host (explicit
    /// `Domain` attributes match subdomains; host-only cookies require an
    /// exact host match), its path is a prefix of the request path, and its
    /// `Secure` flag is satisfied by the request scheme.
    pub fn request_header(&self, url: &Url) -> Option<String> {
        let host = url.host_str().unwrap_or_default();
        let path = url.path();
        let is_https = url.scheme() == "https";

        let mut pairs = Vec::new();
        for (origin, cookies) in &self.entries {
            let bucket_host = origin_host(origin);

            for cookie in cookies {
                if !domain_applies(cookie, &bucket_host, host) {
                    continue;
                }
                if let Some(cookie_path) = &cookie.path {
                    if !path.starts_with(cookie_path.as_str()) {
                        continue;
                    }
                }
                if cookie.secure && !is_https {
                    continue;
                }
                pairs.push(cookie.pair());
            }
        }

        if pairs.is_empty() {
            None
        } else {
            pairs.sort_unstable(); // deterministic order across hash buckets
            Some(pairs.join("; "))
        }
    }

    /// Inserts or replaces a bare `name=value` cookie scoped to `url`'s origin.
    pub fn set(&mut self, name: &str, value: &str, url: &Url) {
        let mut cookie = Cookie::named(name, value);
        cookie.path = Some("/".to_string());
        self.insert(url.origin().ascii_serialization(), cookie);
    }

    /// Returns the cookie named `name`, restricted to cookies whose domain
    /// matches `host` when one is supplied.
    pub fn get(&self, name: &str, host: Option<&str>) -> Option<&Cookie> {
        let hostname = host.map(hostname_of);

        self.entries.iter().find_map(|(origin, cookies)| {
            let bucket_host = origin_host(origin);
            cookies.iter().find(|cookie| {
                cookie.name == name
                    && match &hostname {
                        Some(hostname) => domain_applies(cookie, &bucket_host, hostname),
                        None => true,
                    }
            })
        })
    }

    /// Returns all cookies as a name → cookie map, filtered by domain match
    /// when `host` is supplied.
    pub fn all(&self, host: Option<&str>) -> HashMap<String, Cookie> {
        let hostname = host.map(hostname_of);

        let mut result = HashMap::new();
        for (origin, cookies) in &self.entries {
            let bucket_host = origin_host(origin);
            for cookie in cookies {
                let applies = match &hostname {
                    Some(hostname) => domain_applies(cookie, &bucket_host, hostname),
                    None => true,
                };
                if applies {
                    result.insert(cookie.name.clone(), cookie.clone());
                }
            }
        }

        result
    }

    /// Removes all cookies from the jar.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Total number of stored cookies across all origins.
    pub fn cookie_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cookie_count() == 0
    }

    fn insert(&mut self, origin: String, cookie: Cookie) {
        let bucket = self.entries.entry(origin).or_default();
        if let Some(existing) = bucket.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            bucket.push(cookie);
        }
    }
}

/// Parses a single `Set-Cookie` header value. Returns `None` for values
/// without a `name=` prefix.
fn parse_set_cookie(header_str: &str, default_path: &str) -> Option<Cookie> {
    let (name, rest) = header_str.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut parts = rest.split(';');
    let mut cookie = Cookie::named(name, parts.next().unwrap_or("").trim());

    for part in parts {
        let part = part.trim();
        if let Some((k, v)) = part.split_once('=') {
            let v = v.trim();
            match k.trim().to_ascii_lowercase().as_str() {
                "path" => cookie.path = Some(v.to_string()),
                "domain" => cookie.domain = Some(v.trim_start_matches('.').to_string()),
                "expires" => cookie.expires = Some(v.to_string()),
                "samesite" => {
                    // normalize to "Lax" | "Strict" | "None"
                    cookie.same_site = Some(if v.eq_ignore_ascii_case("lax") {
                        "Lax".to_string()
                    } else if v.eq_ignore_ascii_case("strict") {
                        "Strict".to_string()
                    } else if v.eq_ignore_ascii_case("none") {
                        "None".to_string()
                    } else {
                        v.to_string()
                    });
                }
                _ => {}
            }
        } else if part.eq_ignore_ascii_case("secure") {
            cookie.secure = true;
        } else if part.eq_ignore_ascii_case("httponly") {
            cookie.http_only = true;
        }
    }

    if cookie.path.is_none() {
        cookie.path = Some(default_path.to_string());
    }

    Some(cookie)
}

/// Default cookie path derived from the request URL, per RFC 6265 §5.1.4.
fn default_path_for(url: &Url) -> String {
    url.path()
        .rsplit_once('/')
        .map_or("/", |(a, _)| if a.is_empty() { "/" } else { a })
        .to_string()
}

/// Hostname of an origin string (`"http://example.com:8080"` → `"example.com"`).
fn origin_host(origin: &str) -> String {
    Url::parse(origin)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Hostname of a caller-supplied `host[:port]` filter.
fn hostname_of(host: &str) -> String {
    Url::parse(&format!("http://{host}"))
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| host.to_string())
}

fn domain_applies(cookie: &Cookie, bucket_host: &str, host: &str) -> bool {
    match &cookie.domain {
        // Explicit Domain attribute: exact match or subdomain
        Some(domain) => host == domain || host.ends_with(&format!(".{domain}")),
        // Host-only cookie: exact match against the origin it was set under
        None => host == bucket_host,
    }
}
