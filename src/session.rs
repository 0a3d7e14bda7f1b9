use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "dashboard_session";

/// Request header a page uses to name its own session
///
/// The cookie is shared by every tab of a browser; the header is not.
pub const SESSION_HEADER: &str = "x-dashboard-session";

/// Opaque identifier for one browsing session
///
/// A new token is the only signal that the dashboard was reset: a working dataset
/// stored under any other token is discarded and the source is reloaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Issue a token for a session that is just starting.
    pub fn issue() -> Self {
        SessionToken(Uuid::new_v4())
    }

    /// Replace this session's token, moving the session into reset.
    ///
    /// Takes nothing from the caller besides the old token; the new one is always
    /// fresh, so it never equals `self`.
    pub fn reset(self) -> Self {
        loop {
            let next = SessionToken::issue();
            if next != self {
                return next;
            }
        }
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(SessionToken)
    }
}

#[cfg(feature = "web")]
pub use web::*;

#[cfg(feature = "web")]
mod web {
    use axum::http::HeaderMap;
    use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

    use super::{SESSION_COOKIE, SESSION_HEADER, SessionToken};

    /// Token a request names for itself: the page's header first, then the cookie
    pub fn request_token(headers: &HeaderMap, jar: &CookieJar) -> Option<SessionToken> {
        token_from_headers(headers).or_else(|| token_from_jar(jar))
    }

    /// Token from the session header, if present and well formed
    pub fn token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
        headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }

    /// Token from the session cookie, if present and well formed
    pub fn token_from_jar(jar: &CookieJar) -> Option<SessionToken> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse().ok())
    }

    /// Cookie jar carrying `token` as the current session
    pub fn with_token(jar: CookieJar, token: SessionToken) -> CookieJar {
        let cookie = Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict);

        jar.add(cookie)
    }
}
