//! The [`Session`] type and its request/redirect engine.
//!
//! A session is an identity (opaque id, optional target host, optional user
//! agent) plus its accumulated cookie state. Every request issued through a
//! session carries the jar's matching cookies, and every response, including
//! each intermediate hop of a redirect chain, feeds its `Set-Cookie` headers
//! back into the jar before the next hop is issued.
//!
//! Sessions serialize to a [`SessionExport`] (`{id, host, userAgent,
//! cookies}`), the only representation that crosses a store boundary.

use std::collections::HashMap;
use std::fmt;

use http::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use http::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cookies::{Cookie, SessionJar};
use crate::errors::SessionError;
use crate::net::{JsonResponse, RequestOptions, RequestTarget, Response};
use crate::session::SessionBuilder;

/// Default bound on redirect hops per request.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Observer invoked after a response's cookies have been stored in the jar,
/// with the number of cookies consumed from that response.
pub type CookiesUpdatedHook = Box<dyn Fn(usize) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Http,
    Https,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// An identity plus its accumulated cookie state, used to make authenticated
/// requests against a target site.
pub struct Session {
    pub(crate) id: String,
    pub(crate) host: Option<String>,
    pub(crate) user_agent: Option<String>,
    pub(crate) jar: SessionJar,
    pub(crate) max_redirects: usize,
    pub(crate) on_cookies_updated: Option<CookiesUpdatedHook>,
    pub(crate) client: reqwest::Client,
}

/// The serializable snapshot of a session, usable for persistence or
/// transfer between processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub id: String,
    pub host: Option<String>,
    pub user_agent: Option<String>,
    pub cookies: SessionJar,
}

impl Session {
    /// A fresh session with a generated id and an empty jar.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn jar(&self) -> &SessionJar {
        &self.jar
    }

    /// Issues a request, following redirects and consuming cookies along the
    /// way. Relative URIs resolve against `http://{host}`.
    pub async fn request(
        &mut self,
        target: impl Into<RequestTarget>,
    ) -> Result<Response, SessionError> {
        self.perform(Scheme::Http, target.into()).await
    }

    /// Same as [`Session::request`], but relative URIs resolve against
    /// `https://{host}`.
    pub async fn request_secure(
        &mut self,
        target: impl Into<RequestTarget>,
    ) -> Result<Response, SessionError> {
        self.perform(Scheme::Https, target.into()).await
    }

    /// Issues a JSON request: a JSON content type is attached on the way out
    /// and the terminal response body is parsed as JSON.
    pub async fn request_json(
        &mut self,
        target: impl Into<RequestTarget>,
    ) -> Result<JsonResponse, SessionError> {
        self.perform_json(Scheme::Http, target.into()).await
    }

    /// Same as [`Session::request_json`] over the secure scheme.
    pub async fn request_json_secure(
        &mut self,
        target: impl Into<RequestTarget>,
    ) -> Result<JsonResponse, SessionError> {
        self.perform_json(Scheme::Https, target.into()).await
    }

    /// Snapshot of this session for persistence. Captures the complete jar
    /// state losslessly.
    pub fn export(&self) -> SessionExport {
        SessionExport {
            id: self.id.clone(),
            host: self.host.clone(),
            user_agent: self.user_agent.clone(),
            cookies: self.jar.clone(),
        }
    }

    /// Reconstructs a session from an export snapshot. The resulting session
    /// carries the same id, host, user agent, and cookie set.
    pub fn import(export: SessionExport) -> Self {
        let mut builder = Session::builder().id(export.id).jar(export.cookies);
        if let Some(host) = export.host {
            builder = builder.host(host);
        }
        if let Some(user_agent) = export.user_agent {
            builder = builder.user_agent(user_agent);
        }
        builder.build()
    }

    /// Returns the cookie named `name`, filtered by domain match when a host
    /// is supplied.
    pub fn get_cookie(&self, name: &str, host: Option<&str>) -> Option<&Cookie> {
        self.jar.get(name, host)
    }

    /// All cookies as a name → cookie map, filtered by domain match when a
    /// host is supplied.
    pub fn get_cookies(&self, host: Option<&str>) -> HashMap<String, Cookie> {
        self.jar.all(host)
    }

    /// Inserts a `name=value` cookie scoped to `url`'s origin.
    pub fn set_cookie(
        &mut self,
        name: &str,
        value: &str,
        url: &str,
    ) -> Result<&mut Self, SessionError> {
        let url = Url::parse(url)?;
        self.jar.set(name, value, &url);
        Ok(self)
    }

    async fn perform_json(
        &mut self,
        scheme: Scheme,
        target: RequestTarget,
    ) -> Result<JsonResponse, SessionError> {
        let mut options = target.into_options();
        options.json = true;
        if !options.headers.contains_key(CONTENT_TYPE) {
            options
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let response = self.perform(scheme, RequestTarget::Options(options)).await?;
        let json = serde_json::from_slice(&response.body)?;
        Ok(JsonResponse { response, json })
    }

    async fn perform(
        &mut self,
        scheme: Scheme,
        target: RequestTarget,
    ) -> Result<Response, SessionError> {
        let mut options = target.into_options();
        let mut url = self.resolve_initial(scheme, &options.uri)?;
        let mut hops = 0usize;

        loop {
            let response = self.send(&url, &options).await?;

            let stored = self
                .jar
                .store_response_cookies(&response.url, &response.headers);
            if stored > 0 {
                log::debug!(
                    "session {}: stored {} cookie(s) from {}",
                    self.id,
                    stored,
                    response.url
                );
                if let Some(hook) = &self.on_cookies_updated {
                    hook(stored);
                }
            }

            let Some(location) = response.redirect_location().map(str::to_string) else {
                return Ok(response);
            };

            hops += 1;
            if hops > self.max_redirects {
                return Err(SessionError::TooManyRedirects {
                    limit: self.max_redirects,
                });
            }

            // A host-less Location inherits the authority of the hop we just
            // received, not the session's default host.
            url = response.url.join(&location)?;
            options = options.follow();
            log::trace!("session {}: redirect hop {} -> {}", self.id, hops, url);
        }
    }

    /// Resolves the initial request URI: absolute http(s) URLs win outright,
    /// anything else is joined against the session host under `scheme`.
    fn resolve_initial(&self, scheme: Scheme, uri: &str) -> Result<Url, SessionError> {
        if let Ok(parsed) = Url::parse(uri) {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                return Ok(parsed);
            }
        }

        let host = self
            .host
            .as_deref()
            .ok_or_else(|| SessionError::MissingHost(uri.to_string()))?;
        let base = Url::parse(&format!("{}://{}/", scheme.as_str(), host))?;
        Ok(base.join(uri)?)
    }

    /// One HTTP exchange: jar cookies and the user agent go out, the buffered
    /// response comes back. No redirect handling here.
    async fn send(&self, url: &Url, options: &RequestOptions) -> Result<Response, SessionError> {
        let mut headers = options.headers.clone();

        if let Some(user_agent) = &self.user_agent {
            if !headers.contains_key(USER_AGENT) {
                headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
            }
        }
        if let Some(cookie_header) = self.jar.request_header(url) {
            headers.insert(COOKIE, HeaderValue::from_str(&cookie_header)?);
        }

        let mut request = self
            .client
            .request(options.method.clone(), url.clone())
            .headers(headers);

        if let Some(query) = &options.query {
            request = request.query(query);
        }
        if let Some(form) = &options.form {
            request = request.form(form);
        } else if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        log::trace!("session {}: {} {}", self.id, options.method, url);

        let res = request.send().await?;
        let status = res.status();

        Ok(Response {
            url: res.url().clone(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            headers: res.headers().clone(),
            body: res.bytes().await?.to_vec(),
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("host", &self.host)
            .field("user_agent", &self.user_agent)
            .field("cookies", &self.jar.cookie_count())
            .finish_non_exhaustive()
    }
}
