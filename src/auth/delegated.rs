//! Per-request signed authorization (Delegated mode). No session.

use super::{Authenticator, AuthorizationSigner};
use crate::connection::AuthMode;
use crate::error::Result;
use crate::http::HttpTransport;
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Validity window requested for every signed authorization.
pub const DELEGATED_AUTH_VALIDITY: Duration = Duration::from_millis(30_000);

pub struct DelegatedAuthenticator {
    base_path: String,
    signer: Arc<dyn AuthorizationSigner>,
}

impl DelegatedAuthenticator {
    /// `base_path` is the endpoint's own path; authorizations are scoped to
    /// `base_path + request path`.
    pub fn new(base_path: impl Into<String>, signer: Arc<dyn AuthorizationSigner>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self { base_path, signer }
    }

    pub fn for_endpoint(endpoint: &Url, signer: Arc<dyn AuthorizationSigner>) -> Self {
        Self::new(endpoint.path(), signer)
    }

    pub fn scope_for(&self, path: &str) -> String {
        format!("{}{}", self.base_path, path)
    }
}

#[async_trait]
impl Authenticator for DelegatedAuthenticator {
    fn mode(&self) -> AuthMode { AuthMode::Delegated }

    async fn login(&self, _transport: &HttpTransport) -> Result<()> {
        debug!("delegated auth has no session to establish");
        Ok(())
    }

    async fn obtain_credential(&self, path: &str) -> Result<Option<String>> {
        let scope = self.scope_for(path);
        let authorization = self.signer.sign_authorization(&scope, DELEGATED_AUTH_VALIDITY).await?;
        Ok(Some(serde_json::to_string(&authorization)?))
    }

    fn is_ready(&self) -> bool { true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSigner {
        calls: Mutex<Vec<(String, Duration)>>,
    }

    #[async_trait]
    impl AuthorizationSigner for RecordingSigner {
        async fn sign_authorization(&self, scope: &str, validity: Duration) -> Result<Value> {
            self.calls.lock().unwrap().push((scope.to_string(), validity));
            Ok(json!({ "scope": scope, "sig": "00" }))
        }
    }

    struct FailingSigner;

    #[async_trait]
    impl AuthorizationSigner for FailingSigner {
        async fn sign_authorization(&self, _: &str, _: Duration) -> Result<Value> {
            Err(Error::Signer("locked".into()))
        }
    }

    #[test]
    fn signs_every_request_with_full_path() {
        let signer = Arc::new(RecordingSigner::default());
        let endpoint = Url::parse("https://api.example.com/api/v1/lnurl/").unwrap();
        let auth = DelegatedAuthenticator::for_endpoint(&endpoint, signer.clone());
        let rt = tokio::runtime::Runtime::new().expect("runtime");

        let first = rt.block_on(auth.obtain_credential("/balance")).unwrap().unwrap();
        rt.block_on(auth.obtain_credential("/balance")).unwrap();
        let parsed: Value = serde_json::from_str(&first).unwrap();
        assert_eq!(parsed["scope"], "/api/v1/lnurl/balance");

        let calls = signer.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(_, v)| *v == DELEGATED_AUTH_VALIDITY));
    }

    #[test]
    fn root_endpoint_scopes_to_request_path() {
        let auth = DelegatedAuthenticator::for_endpoint(
            &Url::parse("https://hub.example").unwrap(),
            Arc::new(RecordingSigner::default()),
        );
        assert_eq!(auth.scope_for("/getinfo"), "/getinfo");
    }

    #[test]
    fn always_ready() {
        let auth = DelegatedAuthenticator::new("/", Arc::new(RecordingSigner::default()));
        assert!(auth.is_ready());
        assert_eq!(auth.mode(), AuthMode::Delegated);
    }

    #[test]
    fn signer_failure_propagates() {
        let auth = DelegatedAuthenticator::new("", Arc::new(FailingSigner));
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        assert!(matches!(rt.block_on(auth.obtain_credential("/balance")), Err(Error::Signer(_))));
    }
}
