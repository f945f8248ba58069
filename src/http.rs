//! JSON-over-HTTP transport shared by every wallet call.
//!
//! Every response body is parsed as JSON regardless of status. A body whose
//! `error` field is truthy is a service error, even on HTTP 200.

use crate::config::WalletConfig;
use crate::error::{Result, WalletError, WalletErrorCode};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url, config: &WalletConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(Self { client: builder.build()?, endpoint })
    }

    pub fn endpoint(&self) -> &Url { &self.endpoint }

    /// `endpoint + path`, with `path` (which may carry a query) appended verbatim.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.as_str().trim_end_matches('/'), path)
    }

    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        authorization: Option<&str>,
    ) -> Result<T> {
        let url = self.url_for(path);
        debug!(%method, path, "lndhub request");

        let mut request = self
            .client
            .request(method, &url)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON);
        if let Some(auth) = authorization {
            request = request.header(AUTHORIZATION, auth);
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let json: Value = serde_json::from_slice(&bytes)?;

        if let Some(err) = service_error(&json) {
            warn!(path, %status, code = err.code.as_i64(), message = %err.message, "lndhub error response");
            return Err(err.into());
        }
        Ok(serde_json::from_value(json)?)
    }
}

/// Extract `{ "error": <truthy>, "code": <int>, "message": <string> }`.
pub(crate) fn service_error(body: &Value) -> Option<WalletError> {
    let flag = body.as_object()?.get("error")?;
    if !is_truthy(flag) {
        return None;
    }
    let code = body
        .get("code")
        .and_then(Value::as_i64)
        .map(WalletErrorCode::from)
        .unwrap_or(WalletErrorCode::GeneralError);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(String::from)
        .or_else(|| flag.as_str().map(String::from))
        .unwrap_or_default();
    Some(WalletError { code, message })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
