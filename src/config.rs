use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, Method, Request, Uri, Version};
use jsonwebtoken::Algorithm;
use time::Duration;
use tower_cookies::Cookie;

use crate::SameSite;

/// Cookie name used when none is configured.
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// Session lifetime in seconds used when none is configured (one day).
pub const DEFAULT_MAX_AGE: i64 = 86400;

/// Owned snapshot of the request line and headers.
///
/// Handed to a [`Secure::dynamic`] predicate when a session cookie is about
/// to be written.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
}

impl RequestHead {
    pub(crate) fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            version: req.version(),
            headers: req.headers().clone(),
        }
    }
}

/// Controls the cookie `Secure` attribute.
#[derive(Clone)]
pub enum Secure {
    /// The same value for every response.
    Static(bool),
    /// Decided per response from the request head.
    Dynamic(Arc<dyn Fn(&RequestHead) -> bool + Send + Sync>),
}

impl Secure {
    /// Decide the `Secure` attribute per request, e.g. by checking
    /// `X-Forwarded-Proto` behind a TLS-terminating proxy.
    pub fn dynamic<F>(predicate: F) -> Self
    where
        F: Fn(&RequestHead) -> bool + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(predicate))
    }

    pub(crate) fn resolve(&self, head: Option<&RequestHead>) -> bool {
        match self {
            Self::Static(secure) => *secure,
            Self::Dynamic(predicate) => head.is_some_and(|head| predicate(head)),
        }
    }
}

impl From<bool> for Secure {
    fn from(secure: bool) -> Self {
        Self::Static(secure)
    }
}

impl fmt::Debug for Secure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(secure) => f.debug_tuple("Static").field(secure).finish(),
            Self::Dynamic(_) => f.debug_tuple("Dynamic").field(&"..").finish(),
        }
    }
}

#[derive(Clone)]
pub struct JwtSessionConfig {
    pub(crate) name: Cow<'static, str>,
    pub(crate) secret: Cow<'static, str>,
    pub(crate) secure: Secure,
    pub(crate) max_age: i64,
    pub(crate) domain: Option<Cow<'static, str>>,
    pub(crate) http_only: bool,
    pub(crate) path: Cow<'static, str>,
    pub(crate) same_site: Option<SameSite>,
    pub(crate) algorithm: Algorithm,
    pub(crate) issuer: Option<String>,
    pub(crate) subject: Option<String>,
    pub(crate) audience: Option<String>,
}

impl JwtSessionConfig {
    /// Create a configuration with the given signing secret and the default
    /// value for everything else.
    ///
    /// # Panics
    ///
    /// Panics if `secret` is empty.
    pub fn new<S: Into<Cow<'static, str>>>(secret: S) -> Self {
        let secret = secret.into();
        assert!(!secret.is_empty(), "session secret must not be empty");

        Self {
            name: DEFAULT_COOKIE_NAME.into(),
            secret,
            secure: Secure::Static(false),
            max_age: DEFAULT_MAX_AGE,
            domain: None,
            http_only: true,
            path: "/".into(),
            same_site: None,
            algorithm: Algorithm::HS256,
            issuer: None,
            subject: None,
            audience: None,
        }
    }

    #[must_use]
    pub fn with_name<N: Into<Cow<'static, str>>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Set the cookie `Secure` attribute, either as a fixed `bool` or as a
    /// per-request [`Secure::dynamic`] predicate.
    #[must_use]
    pub fn with_secure<S: Into<Secure>>(mut self, secure: S) -> Self {
        self.secure = secure.into();
        self
    }

    /// Session lifetime in seconds. Doubles as the cookie `Max-Age` and the
    /// token expiry window.
    #[must_use]
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    #[must_use]
    pub fn with_domain<D: Into<Cow<'static, str>>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn with_path<P: Into<Cow<'static, str>>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Pin the signature algorithm used for signing and verification.
    ///
    /// # Panics
    ///
    /// Panics unless `algorithm` is one of the HMAC variants (`HS256`,
    /// `HS384`, `HS512`); keys are derived from the shared secret.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        assert!(
            matches!(
                algorithm,
                Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
            ),
            "session tokens are signed with the shared secret; use an HMAC algorithm"
        );
        self.algorithm = algorithm;
        self
    }

    /// Set the `iss` claim. Tokens are both issued with it and required to
    /// carry it.
    #[must_use]
    pub fn with_issuer<I: Into<String>>(mut self, issuer: I) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the `sub` claim. Tokens are both issued with it and required to
    /// carry it.
    #[must_use]
    pub fn with_subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the `aud` claim. Tokens are both issued with it and required to
    /// carry it.
    #[must_use]
    pub fn with_audience<A: Into<String>>(mut self, audience: A) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub(crate) fn session_cookie(&self, token: String, secure: bool) -> Cookie<'static> {
        let mut cookie_builder = Cookie::build((self.name.clone(), token))
            .http_only(self.http_only)
            .secure(secure)
            .path(self.path.clone())
            .max_age(Duration::seconds(self.max_age));

        if let Some(same_site) = self.same_site {
            cookie_builder = cookie_builder.same_site(same_site);
        }

        if let Some(domain) = self.domain.clone() {
            cookie_builder = cookie_builder.domain(domain);
        }

        cookie_builder.build()
    }

    pub(crate) fn removal_cookie(&self, secure: bool) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new(), secure);
        cookie.set_max_age(Duration::ZERO);
        cookie
    }
}

impl fmt::Debug for JwtSessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSessionConfig")
            .field("name", &self.name)
            .field("secret", &"[REDACTED]")
            .field("secure", &self.secure)
            .field("max_age", &self.max_age)
            .field("domain", &self.domain)
            .field("http_only", &self.http_only)
            .field("path", &self.path)
            .field("same_site", &self.same_site)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("subject", &self.subject)
            .field("audience", &self.audience)
            .finish()
    }
}
