//! LndHubWallet - LNDHub client over either authentication scheme

use super::{LightningWallet, WalletInfo};
use crate::auth::{Authenticator, AuthorizationSigner, DelegatedAuthenticator, SessionAuthenticator};
use crate::config::WalletConfig;
use crate::connection::{AuthMode, ConnectionDescriptor};
use crate::error::{Error, Result, WalletError, WalletErrorCode};
use crate::http::HttpTransport;
use crate::invoice::{decode_invoice, InvoiceRequest, InvoiceState, Sats, WalletInvoice};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

pub struct LndHubWallet {
    transport: HttpTransport,
    auth: Arc<dyn Authenticator>,
}

impl LndHubWallet {
    /// Direct-mode client from an `lndhub://` string. `snort://` needs [`Self::with_signer`].
    pub fn new(connection: &str) -> Result<Self> {
        Self::from_config(&WalletConfig::new(connection), None)
    }

    pub fn with_signer(connection: &str, signer: Arc<dyn AuthorizationSigner>) -> Result<Self> {
        Self::from_config(&WalletConfig::new(connection), Some(signer))
    }

    /// Parse the connection string and pick the authenticator for its mode.
    /// The signer is only consulted in Delegated mode, where it is required.
    pub fn from_config(config: &WalletConfig, signer: Option<Arc<dyn AuthorizationSigner>>) -> Result<Self> {
        let descriptor = ConnectionDescriptor::parse(&config.connection)?;
        let auth: Arc<dyn Authenticator> = match descriptor.mode() {
            AuthMode::Direct => Arc::new(SessionAuthenticator::new(
                descriptor.username().unwrap_or_default(),
                descriptor.password().unwrap_or_default(),
            )),
            AuthMode::Delegated => {
                let signer = signer.ok_or_else(|| Error::config("snort:// connections need an authorization signer"))?;
                Arc::new(DelegatedAuthenticator::for_endpoint(descriptor.endpoint(), signer))
            }
        };
        Self::with_authenticator(descriptor.endpoint().clone(), auth, config)
    }

    /// Client for an explicit endpoint and authenticator. `config.connection` is ignored.
    pub fn with_authenticator(endpoint: Url, auth: Arc<dyn Authenticator>, config: &WalletConfig) -> Result<Self> {
        Ok(Self { transport: HttpTransport::new(endpoint, config)?, auth })
    }

    pub fn mode(&self) -> AuthMode { self.auth.mode() }

    pub fn endpoint(&self) -> &Url { self.transport.endpoint() }

    /// Like [`LightningWallet::login`] but keeps the error.
    pub async fn try_login(&self) -> Result<()> {
        self.auth.login(&self.transport).await
    }

    async fn get_json<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T> {
        let authorization = self.auth.obtain_credential(path).await?;
        self.transport.send(method, path, body.as_ref(), authorization.as_deref()).await
    }
}

#[async_trait]
impl LightningWallet for LndHubWallet {
    fn is_ready(&self) -> bool {
        self.auth.is_ready()
    }

    async fn close(&self) -> bool {
        true
    }

    async fn get_info(&self) -> Result<WalletInfo> {
        self.get_json(Method::GET, "/getinfo", None).await
    }

    async fn login(&self) -> bool {
        match self.try_login().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "lndhub login failed");
                false
            }
        }
    }

    async fn get_balance(&self) -> Result<Sats> {
        let rsp: BalanceResponse = self.get_json(Method::GET, "/balance", None).await?;
        Ok(rsp.btc.available_balance.floor().max(0.0) as Sats)
    }

    async fn create_invoice(&self, req: InvoiceRequest) -> Result<WalletInvoice> {
        let body = json!({ "amt": req.amount, "memo": req.memo });
        let rsp: AddInvoiceResponse = self.get_json(Method::POST, "/addinvoice", Some(body)).await?;
        let payment_request = rsp
            .payment_request
            .or(rsp.pay_req)
            .ok_or_else(|| serde_json::Error::missing_field("payment_request"))?;

        // The service echoes identifiers only; amount and memo come from the request.
        let decoded = decode_invoice(&payment_request);
        let payment_hash = rsp
            .payment_hash
            .or_else(|| decoded.as_ref().map(|d| d.payment_hash.clone()))
            .or(rsp.r_hash)
            .unwrap_or_default();
        let timestamp = rsp
            .timestamp
            .or_else(|| decoded.as_ref().map(|d| d.timestamp))
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        Ok(WalletInvoice {
            payment_request,
            memo: req.memo,
            amount: req.amount,
            payment_hash,
            timestamp,
            state: InvoiceState::Unpaid,
        })
    }

    async fn pay_invoice(&self, payment_request: &str) -> Result<WalletInvoice> {
        let body = json!({ "invoice": payment_request });
        let rsp: PayInvoiceResponse = self.get_json(Method::POST, "/payinvoice", Some(body)).await?;

        // Any payment_error key, even null or "", means settlement is unconfirmed.
        let state = match rsp.payment_error.as_ref() {
            Some(err) => {
                warn!(payment_error = %err, "lndhub payment not confirmed");
                InvoiceState::Pending
            }
            None => InvoiceState::Paid,
        };

        let invoice = match decode_invoice(payment_request) {
            Some(decoded) => WalletInvoice {
                payment_hash: rsp.payment_hash.unwrap_or(decoded.payment_hash),
                state,
                ..decoded
            },
            None => WalletInvoice {
                payment_request: payment_request.to_string(),
                memo: String::new(),
                amount: 0,
                payment_hash: rsp.payment_hash.unwrap_or_default(),
                timestamp: 0,
                state,
            },
        };
        Ok(invoice)
    }

    async fn get_invoices(&self) -> Result<Vec<WalletInvoice>> {
        let records: Vec<UserInvoice> = self.get_json(Method::GET, "/getuserinvoices", None).await?;
        records
            .iter()
            .map(|record| -> Result<WalletInvoice> {
                let decoded = record
                    .payment_request()
                    .and_then(decode_invoice)
                    .ok_or_else(|| WalletError::new(WalletErrorCode::InvalidInvoice, "Failed to parse invoice"))?;
                Ok(record.reconcile(decoded))
            })
            .collect()
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    #[serde(rename = "BTC")]
    btc: BtcBalance,
}

#[derive(Debug, Deserialize)]
struct BtcBalance {
    #[serde(rename = "AvailableBalance")]
    available_balance: f64,
}

#[derive(Debug, Deserialize)]
struct AddInvoiceResponse {
    #[serde(default)]
    payment_request: Option<String>,
    #[serde(default)]
    pay_req: Option<String>,
    #[serde(default, deserialize_with = "de_hash")]
    payment_hash: Option<String>,
    #[serde(default, deserialize_with = "de_hash")]
    r_hash: Option<String>,
    #[serde(default, deserialize_with = "de_i64")]
    timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PayInvoiceResponse {
    #[serde(default, deserialize_with = "de_present")]
    payment_error: Option<Value>,
    #[serde(default, deserialize_with = "de_hash")]
    payment_hash: Option<String>,
}

/// One record from `/getuserinvoices`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInvoice {
    #[serde(default)]
    pub payment_request: Option<String>,
    #[serde(default)]
    pub pay_req: Option<String>,
    #[serde(default, deserialize_with = "de_hash")]
    pub payment_hash: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ispaid: Option<bool>,
    #[serde(default, deserialize_with = "de_i64")]
    pub amt: Option<i64>,
}

impl UserInvoice {
    pub fn payment_request(&self) -> Option<&str> {
        self.payment_request.as_deref().or(self.pay_req.as_deref())
    }

    /// Overlay the service's view on the decoded invoice. The service's hash,
    /// description and paid flag win; state only ever advances. `amt` fills in
    /// the amount of amountless invoices.
    pub fn reconcile(&self, decoded: WalletInvoice) -> WalletInvoice {
        let amount = match (decoded.amount, self.amt) {
            (0, Some(amt)) => Sats::try_from(amt).unwrap_or(0),
            (amount, _) => amount,
        };
        let state = if self.ispaid.unwrap_or(false) {
            decoded.state.advance(InvoiceState::Paid)
        } else {
            decoded.state
        };
        WalletInvoice {
            payment_hash: self.payment_hash.clone().filter(|h| !h.is_empty()).unwrap_or(decoded.payment_hash),
            memo: self.description.clone().unwrap_or(decoded.memo),
            amount,
            state,
            ..decoded
        }
    }
}

/// Hex string, or a serialized Node `Buffer` (`{"type":"Buffer","data":[..]}`).
fn de_hash<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let bytes = |items: &Vec<Value>| -> Option<String> {
        let raw: Option<Vec<u8>> = items.iter().map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok())).collect();
        raw.map(hex::encode)
    };
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Array(items)) => bytes(&items),
        Some(Value::Object(obj)) => obj.get("data").and_then(Value::as_array).and_then(bytes),
        _ => None,
    })
}

/// `Some` whenever the key is present, `null` included.
fn de_present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Integer given as a number or a numeric string.
fn de_i64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
