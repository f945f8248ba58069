//! Wallet - Lightning wallet interface and the LNDHub client
//!
//! # Architecture
//!
//! ```text
//! LightningWallet (trait)
//!     │
//!     └── LndHubWallet
//!             │
//!             ├── Authenticator ── Session (lndhub://) | signed event (snort://)
//!             │
//!             └── HttpTransport ── JSON over HTTPS, error payload detection
//! ```
//!
//! # Endpoints
//!
//! | Path | Method | Operation |
//! |------|--------|-----------|
//! | `/getinfo` | GET | `get_info` |
//! | `/auth?type=auth` | POST | `login` (Direct only) |
//! | `/balance` | GET | `get_balance` |
//! | `/addinvoice` | POST | `create_invoice` |
//! | `/payinvoice` | POST | `pay_invoice` |
//! | `/getuserinvoices` | GET | `get_invoices` |

mod lndhub;

pub use lndhub::{LndHubWallet, UserInvoice};

use crate::error::Result;
use crate::invoice::{InvoiceRequest, Sats, WalletInvoice};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Operations every Lightning wallet backend offers.
#[async_trait]
pub trait LightningWallet: Send + Sync {
    /// Whether calls can be made without logging in first.
    fn is_ready(&self) -> bool;

    /// Release resources. Always succeeds.
    async fn close(&self) -> bool;

    async fn get_info(&self) -> Result<WalletInfo>;

    /// Authenticate. Failures are logged and reported as `false`.
    async fn login(&self) -> bool;

    async fn get_balance(&self) -> Result<Sats>;

    async fn create_invoice(&self, req: InvoiceRequest) -> Result<WalletInvoice>;

    async fn pay_invoice(&self, payment_request: &str) -> Result<WalletInvoice>;

    /// All-or-nothing: one undecodable invoice fails the whole call.
    async fn get_invoices(&self) -> Result<Vec<WalletInvoice>>;
}

/// Node metadata from `/getinfo`. Fields the service adds beyond these are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub alias: Option<String>,
    #[serde(rename = "identity_pubkey")]
    pub node_pubkey: Option<String>,
    pub block_height: Option<u64>,
    pub block_hash: Option<String>,
    pub synced_to_chain: Option<bool>,
    pub version: Option<String>,
    pub num_active_channels: Option<u64>,
    pub num_pending_channels: Option<u64>,
    pub num_peers: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
