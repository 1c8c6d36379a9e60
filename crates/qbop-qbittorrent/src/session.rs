//! Session state shared by every request issued through a client.

use std::fmt::{self, Debug, Formatter};

use reqwest::header::{HeaderMap, SET_COOKIE};

/// Name of the qBittorrent session cookie.
pub(crate) const SESSION_COOKIE: &str = "SID";

/// Login credentials kept for re-authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl Credentials {
    /// Bundle a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Debug for Credentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token plus the credentials that produced it.
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub(crate) sid: Option<String>,
    pub(crate) credentials: Option<Credentials>,
}

/// Extract the session token from the `Set-Cookie` headers of a login response.
pub(crate) fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|raw| cookie_pair(raw, SESSION_COOKIE))
}

/// Parse the leading `name=value` pair of a `Set-Cookie` header.
fn cookie_pair(raw: &str, needle: &str) -> Option<String> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    if !name.trim().eq_ignore_ascii_case(needle) {
        return None;
    }
    let value = value.trim().trim_matches('"');
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}
