use uuid::Uuid;

use crate::cookies::SessionJar;
use crate::session::session::{CookiesUpdatedHook, Session, DEFAULT_MAX_REDIRECTS};

/// Builder for [`Session`]. Obtained via [`Session::builder`].
pub struct SessionBuilder {
    id: Option<String>,
    host: Option<String>,
    user_agent: Option<String>,
    jar: Option<SessionJar>,
    max_redirects: usize,
    on_cookies_updated: Option<CookiesUpdatedHook>,
}

impl SessionBuilder {
    pub(crate) fn new() -> Self {
        Self {
            id: None,
            host: None,
            user_agent: None,
            jar: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            on_cookies_updated: None,
        }
    }

    /// Fixes the session id instead of generating one.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Default authority (`host[:port]`, no scheme) used to absolutize
    /// path-only request URIs.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// `User-Agent` header value attached to every outgoing request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Starts from a pre-populated cookie jar.
    pub fn jar(mut self, jar: SessionJar) -> Self {
        self.jar = Some(jar);
        self
    }

    /// Redirect hops allowed per request before the request fails.
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Observer called with the number of cookies stored whenever a response
    /// updates the jar. No observer is installed by default.
    pub fn on_cookies_updated(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_cookies_updated = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Session {
        // Redirects are followed by the engine itself, per hop, so the jar
        // can be updated before the next hop goes out.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Session {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            host: self.host,
            user_agent: self.user_agent,
            jar: self.jar.unwrap_or_default(),
            max_redirects: self.max_redirects,
            on_cookies_updated: self.on_cookies_updated,
            client,
        }
    }
}
