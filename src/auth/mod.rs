//! Authentication - one capability interface, two schemes.
//!
//! ```text
//! LndHubWallet ──► Authenticator::obtain_credential(path)
//!                      │
//!                      ├── SessionAuthenticator   (lndhub://)  "Bearer <access_token>"
//!                      │        └── login(): POST /auth?type=auth, cached Session
//!                      │
//!                      └── DelegatedAuthenticator (snort://)   signed event JSON
//!                               └── AuthorizationSigner::sign_authorization(scope, 30s)
//! ```

mod delegated;
mod session;

pub use delegated::{DelegatedAuthenticator, DELEGATED_AUTH_VALIDITY};
pub use session::{Session, SessionAuthenticator, AUTH_PATH};

use crate::connection::AuthMode;
use crate::error::Result;
use crate::http::HttpTransport;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Produces the `Authorization` header for each request.
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn mode(&self) -> AuthMode;

    /// Establish whatever state later credentials depend on.
    async fn login(&self, transport: &HttpTransport) -> Result<()>;

    /// Header value for a request to `path` (relative to the endpoint).
    /// `None` sends the request without an `Authorization` header.
    async fn obtain_credential(&self, path: &str) -> Result<Option<String>>;

    /// Whether requests can be sent without calling `login` first.
    fn is_ready(&self) -> bool;
}

/// External collaborator that signs a request-scoped authorization object.
/// The wallet treats the returned value as opaque and sends it as JSON.
#[async_trait]
pub trait AuthorizationSigner: Send + Sync {
    async fn sign_authorization(&self, scope: &str, validity: Duration) -> Result<Value>;
}
