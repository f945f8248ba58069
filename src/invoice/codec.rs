//! BOLT11 payment request → [`WalletInvoice`]

use super::{InvoiceState, WalletInvoice};
use lightning_invoice::{Bolt11Invoice, Bolt11InvoiceDescription};
use std::str::FromStr;
use std::time::Duration;

/// Decode a payment request, judging expiry against the current clock.
pub fn decode_invoice(payment_request: &str) -> Option<WalletInvoice> {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    decode_invoice_at(payment_request, Duration::from_secs(now))
}

/// Decode a payment request as of `now` (seconds since the Unix epoch).
///
/// Returns `None` for anything that is not a valid BOLT11 string. A `lightning:`
/// URI prefix is accepted. Amountless invoices decode with an amount of 0.
pub fn decode_invoice_at(payment_request: &str, now: Duration) -> Option<WalletInvoice> {
    let raw = strip_uri_prefix(payment_request.trim());
    let invoice = match Bolt11Invoice::from_str(raw) {
        Ok(invoice) => invoice,
        Err(e) => {
            tracing::debug!(error = %e, "payment request did not decode");
            return None;
        }
    };

    let memo = match invoice.description() {
        Bolt11InvoiceDescription::Direct(description) => description.to_string(),
        Bolt11InvoiceDescription::Hash(_) => String::new(),
    };
    let expires_at = invoice.duration_since_epoch().saturating_add(invoice.expiry_time());
    let state = if expires_at <= now { InvoiceState::Expired } else { InvoiceState::Unpaid };

    Some(WalletInvoice {
        payment_request: raw.to_string(),
        memo,
        amount: invoice.amount_milli_satoshis().unwrap_or(0) / 1000,
        payment_hash: invoice.payment_hash().to_string(),
        timestamp: invoice.duration_since_epoch().as_secs() as i64,
        state,
    })
}

fn strip_uri_prefix(pr: &str) -> &str {
    const PREFIX: &str = "lightning:";
    match pr.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => &pr[PREFIX.len()..],
        _ => pr,
    }
}
