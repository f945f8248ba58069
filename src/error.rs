//! Error types for wallet operations.
//!
//! Three failure families reach callers:
//! - [`Error::Config`] - the connection string could not be parsed
//! - [`Error::Transport`] / [`Error::MalformedResponse`] - the round trip itself failed
//! - [`Error::Wallet`] - the service answered with an error payload
//!
//! Login failures arrive wrapped in [`Error::LoginFailed`]; [`Error::root`] unwraps them.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("authorization signer failed: {0}")]
    Signer(String),

    /// A login attempt failed. Every caller that shared the attempt gets the same cause.
    #[error("login failed: {0}")]
    LoginFailed(Arc<Error>),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The underlying cause, looking through [`Error::LoginFailed`].
    pub fn root(&self) -> &Error {
        match self {
            Self::LoginFailed(cause) => cause.root(),
            other => other,
        }
    }

    /// True for failures of the HTTP round trip rather than of the wallet.
    pub fn is_transport(&self) -> bool {
        matches!(self.root(), Self::Transport(_) | Self::MalformedResponse(_))
    }

    pub fn wallet_error(&self) -> Option<&WalletError> {
        match self.root() {
            Self::Wallet(err) => Some(err),
            _ => None,
        }
    }
}

/// Error reported by the wallet service (or the reserved local `InvalidInvoice`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("wallet error {code}: {message}")]
pub struct WalletError {
    pub code: WalletErrorCode,
    pub message: String,
}

impl WalletError {
    pub fn new(code: impl Into<WalletErrorCode>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

/// LNDHub error codes. Unknown codes pass through as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletErrorCode {
    BadAuth,
    NotEnoughBalance,
    BadPartner,
    InvalidInvoice,
    RouteNotFound,
    GeneralError,
    NodeFailure,
    Other(i64),
}

impl WalletErrorCode {
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::BadAuth => 1,
            Self::NotEnoughBalance => 2,
            Self::BadPartner => 3,
            Self::InvalidInvoice => 4,
            Self::RouteNotFound => 5,
            Self::GeneralError => 6,
            Self::NodeFailure => 7,
            Self::Other(code) => *code,
        }
    }
}

impl From<i64> for WalletErrorCode {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::BadAuth,
            2 => Self::NotEnoughBalance,
            3 => Self::BadPartner,
            4 => Self::InvalidInvoice,
            5 => Self::RouteNotFound,
            6 => Self::GeneralError,
            7 => Self::NodeFailure,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for WalletErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "{}", code),
            named => write!(f, "{:?} ({})", named, named.as_i64()),
        }
    }
}
