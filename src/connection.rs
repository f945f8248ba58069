//! Connection strings
//!
//! | Form | Mode |
//! |------|------|
//! | `lndhub://<user>:<password>@<host>[/path]` | [`AuthMode::Direct`] |
//! | `snort://<host>[/path]` | [`AuthMode::Delegated`] |
//!
//! The Direct remainder may carry its own scheme (`lndhub://u:p@https://hub.example`);
//! without one it is served over https.

use crate::error::{Error, Result};
use regex::Regex;
use reqwest::Url;
use std::fmt;
use std::sync::OnceLock;

const LNDHUB_SCHEME: &str = "lndhub://";
const SNORT_SCHEME: &str = "snort://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Username/password login, cached bearer session.
    Direct,
    /// Per-request signed authorization from an external signer.
    Delegated,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Direct => "lndhub",
            AuthMode::Delegated => "snort",
        }
    }
}

/// Parsed connection string. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    mode: AuthMode,
    endpoint: Url,
    credentials: Option<(String, String)>,
}

impl ConnectionDescriptor {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.starts_with(LNDHUB_SCHEME) {
            Self::parse_direct(input)
        } else if input.starts_with(SNORT_SCHEME) {
            Self::parse_delegated(input)
        } else {
            Err(Error::config("Invalid config"))
        }
    }

    fn parse_direct(input: &str) -> Result<Self> {
        static LNDHUB_RE: OnceLock<Regex> = OnceLock::new();
        let re = LNDHUB_RE.get_or_init(|| {
            Regex::new(r"^lndhub://([^\s:@/]+):(\S+)@([^\s@]+)$").expect("static regex")
        });
        let invalid = || Error::config("Invalid LNDHUB config");

        let caps = re.captures(input).ok_or_else(invalid)?;
        let (user, password, rest) = (&caps[1], &caps[2], &caps[3]);

        let absolute = if rest.contains("://") { rest.to_string() } else { format!("https://{}", rest) };
        let endpoint = Url::parse(&absolute).map_err(|_| invalid())?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host_str().map_or(true, str::is_empty) {
            return Err(invalid());
        }

        Ok(Self {
            mode: AuthMode::Direct,
            endpoint,
            credentials: Some((user.to_string(), password.to_string())),
        })
    }

    fn parse_delegated(input: &str) -> Result<Self> {
        let invalid = || Error::config("Invalid config");
        let url = Url::parse(input).map_err(|_| invalid())?;
        let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
        let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
        let endpoint = Url::parse(&format!("https://{}{}{}", host, port, url.path())).map_err(|_| invalid())?;
        Ok(Self { mode: AuthMode::Delegated, endpoint, credentials: None })
    }

    pub fn mode(&self) -> AuthMode { self.mode }
    pub fn endpoint(&self) -> &Url { &self.endpoint }
    pub fn username(&self) -> Option<&str> { self.credentials.as_ref().map(|(u, _)| u.as_str()) }
    pub fn password(&self) -> Option<&str> { self.credentials.as_ref().map(|(_, p)| p.as_str()) }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("mode", &self.mode)
            .field("endpoint", &self.endpoint.as_str())
            .field("username", &self.username())
            .field("password", &self.password().map(|_| "***"))
            .finish()
    }
}

impl std::str::FromStr for ConnectionDescriptor {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}
