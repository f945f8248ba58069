//! Username/password sessions (Direct mode).

use super::Authenticator;
use crate::connection::AuthMode;
use crate::error::{Error, Result};
use crate::http::HttpTransport;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const AUTH_PATH: &str = "/auth?type=auth";

/// Tokens returned by `/auth`. Replaced as a whole on every login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("token_type", &self.token_type)
            .finish()
    }
}

pub struct SessionAuthenticator {
    login: String,
    password: String,
    session: RwLock<Option<Arc<Session>>>,
    /// Bumped after every completed login attempt, successful or not.
    generation: AtomicU64,
    /// Outcome of the latest attempt, handed to callers that waited on it.
    last_outcome: StdMutex<std::result::Result<(), Arc<Error>>>,
    /// Held for the duration of a login request.
    login_gate: Mutex<()>,
}

impl SessionAuthenticator {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            session: RwLock::new(None),
            generation: AtomicU64::new(0),
            last_outcome: StdMutex::new(Ok(())),
            login_gate: Mutex::new(()),
        }
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace_session(&self, session: Session) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(session));
    }

    fn finish_attempt(&self, outcome: std::result::Result<(), Arc<Error>>) -> Result<()> {
        *self.last_outcome.lock().unwrap_or_else(PoisonError::into_inner) = outcome.clone();
        self.generation.fetch_add(1, Ordering::AcqRel);
        outcome.map_err(Error::LoginFailed)
    }
}

#[async_trait]
impl Authenticator for SessionAuthenticator {
    fn mode(&self) -> AuthMode { AuthMode::Direct }

    /// Single-flight: callers arriving while a login is in flight wait for it and
    /// get its outcome, success or failure. A login started after the previous one
    /// finished always goes to the server.
    async fn login(&self, transport: &HttpTransport) -> Result<()> {
        let seen = self.generation.load(Ordering::Acquire);
        let _gate = self.login_gate.lock().await;
        if self.generation.load(Ordering::Acquire) != seen {
            debug!("joined in-flight lndhub login");
            let outcome = self.last_outcome.lock().unwrap_or_else(PoisonError::into_inner).clone();
            return outcome.map_err(Error::LoginFailed);
        }

        let body = json!({ "login": self.login, "password": self.password });
        let outcome = match transport.send::<Session>(Method::POST, AUTH_PATH, Some(&body), None).await {
            Ok(session) => {
                self.replace_session(session);
                info!(user = %self.login, "lndhub session established");
                Ok(())
            }
            Err(e) => Err(Arc::new(e)),
        };
        self.finish_attempt(outcome)
    }

    async fn obtain_credential(&self, _path: &str) -> Result<Option<String>> {
        Ok(self.session().map(|s| format!("Bearer {}", s.access_token)))
    }

    fn is_ready(&self) -> bool {
        self.session().is_some()
    }
}
