//! Nostr - signs delegated-mode authorizations with local keys
//!
//! Each authorization is an HTTP-auth event (NIP-98 kind 27235):
//! - `content`: the request path it authorizes
//! - `u` tag: the same path
//! - `expiration` tag (NIP-40): `created_at` + validity window
//!
//! The signed event is sent verbatim as JSON in the `Authorization` header.

use crate::auth::AuthorizationSigner;
use crate::error::{Error, Result};
use async_trait::async_trait;
use nostr::{Keys, Kind, Tag, Timestamp, UnsignedEvent};
use serde_json::Value;
use std::time::Duration;

pub mod kinds {
    /// HTTP auth (NIP-98)
    pub const HTTP_AUTH: u16 = 27235;
}

/// [`AuthorizationSigner`] backed by a Nostr keypair.
#[derive(Debug, Clone)]
pub struct NostrSigner {
    keys: Keys,
}

impl NostrSigner {
    pub fn new(keys: Keys) -> Self { Self { keys } }

    /// Accepts a hex secret key or `nsec…`.
    pub fn from_secret(secret: &str) -> Result<Self> {
        let keys = Keys::parse(secret.trim()).map_err(|e| Error::Signer(format!("secret key: {}", e)))?;
        Ok(Self { keys })
    }

    pub fn pubkey_hex(&self) -> String {
        self.keys.public_key().to_hex()
    }

    fn tag(values: &[&str]) -> Result<Tag> {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        Tag::parse(&values).map_err(|e| Error::Signer(format!("tag: {}", e)))
    }
}

#[async_trait]
impl AuthorizationSigner for NostrSigner {
    async fn sign_authorization(&self, scope: &str, validity: Duration) -> Result<Value> {
        let created_at = Timestamp::now();
        let expires_at = created_at.as_u64() + validity.as_secs().max(1);
        let tags = vec![
            Self::tag(&["u", scope])?,
            Self::tag(&["expiration", &expires_at.to_string()])?,
        ];

        let unsigned = UnsignedEvent::new(
            self.keys.public_key(),
            created_at,
            Kind::from(kinds::HTTP_AUTH),
            tags,
            scope.to_string(),
        );
        let event = unsigned
            .sign_with_keys(&self.keys)
            .map_err(|e| Error::Signer(e.to_string()))?;
        Ok(serde_json::to_value(&event)?)
    }
}
