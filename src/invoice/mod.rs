//! Invoices - domain records and BOLT11 decoding
//!
//! | Type | Role |
//! |------|------|
//! | [`InvoiceRequest`] | Caller input for `create_invoice` |
//! | [`WalletInvoice`] | Invoice as seen by the wallet (decoded and/or service-reported) |
//! | [`InvoiceState`] | Unpaid → Pending → Expired / Paid, never backwards |

pub(crate) mod codec;

pub use codec::{decode_invoice, decode_invoice_at};

use serde::{Deserialize, Serialize};

/// Amount in satoshis.
pub type Sats = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub amount: Sats,
    pub memo: String,
}

impl InvoiceRequest {
    pub fn new(amount: Sats, memo: impl Into<String>) -> Self {
        Self { amount, memo: memo.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceState {
    Unpaid,
    Pending,
    Expired,
    Paid,
}

impl InvoiceState {
    fn rank(self) -> u8 {
        match self {
            Self::Unpaid => 0,
            Self::Pending => 1,
            Self::Expired => 2,
            Self::Paid => 3,
        }
    }

    /// Combine the current state with a newly observed one. The result never
    /// moves back toward Unpaid; Paid outranks everything.
    pub fn advance(self, observed: InvoiceState) -> InvoiceState {
        if observed.rank() > self.rank() { observed } else { self }
    }

    pub fn is_final(self) -> bool {
        matches!(self, Self::Paid | Self::Expired)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInvoice {
    pub payment_request: String,
    pub memo: String,
    pub amount: Sats,
    pub payment_hash: String,
    pub timestamp: i64,
    pub state: InvoiceState,
}
