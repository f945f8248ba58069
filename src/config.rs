//! Wallet configuration - passed from higher layers or read from the environment

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

pub const ENV_URL: &str = "LNDHUB_URL";
pub const ENV_TIMEOUT_SECS: &str = "LNDHUB_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "LNDHUB_USER_AGENT";

/// Client configuration. Higher layers construct this.
#[derive(Clone, Default)]
pub struct WalletConfig {
    /// `lndhub://…` or `snort://…` connection string.
    pub connection: String,
    /// Per-request deadline. `None` means no client-side timeout.
    pub request_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl WalletConfig {
    pub fn new(connection: impl Into<String>) -> Self {
        Self { connection: connection.into(), ..Default::default() }
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self { self.request_timeout = Some(timeout); self }
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self { self.user_agent = Some(agent.into()); self }

    /// Read `LNDHUB_URL` (required), `LNDHUB_TIMEOUT_SECS` and `LNDHUB_USER_AGENT`.
    pub fn from_env() -> Result<Self> {
        let connection = std::env::var(ENV_URL)
            .map_err(|_| Error::config(format!("{} is not set", ENV_URL)))?;
        let mut config = Self::new(connection);

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("{} must be whole seconds, got {:?}", ENV_TIMEOUT_SECS, raw)))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Ok(agent) = std::env::var(ENV_USER_AGENT) {
            config = config.with_user_agent(agent);
        }
        Ok(config)
    }
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The connection string carries the password in Direct mode.
        let scheme = self.connection.split("://").next().unwrap_or_default();
        f.debug_struct("WalletConfig")
            .field("connection", &format!("{}://…", scheme))
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
