//! Mock LNDHub server (axum) for integration tests.
#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const LOGIN: &str = "alice";
pub const PASSWORD: &str = "secret";

// Signed BOLT11 invoices (mainnet, timestamp 1700000000).
/// 1000 sats, memo "coffee", expires in 100 years.
pub const COFFEE: &str = "lnbc10u1pj48ugqpp5qqqsyqcyq5rqwzqfpg9scrgwpugpzysnzs23v9ccrydpk8qarc0ssp5gfpyysjzgfpyysjzgfpyysjzgfpyysjzgfpyysjzgfpyysjzgfpqdq2vdhkven9v5xq8zals8sqcqpj9qrsgqs8hdtgve6epq3ce90xne9u55mcpf8nkw7e3ecg7nwhg4nd4h8tj4er8d5lh4x4e2kl48spqc6ensl645qpwh7d7uyplr5n6jukuzrkcqmrwwhh";
pub const COFFEE_HASH: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
/// 250 sats, memo "expired tea", one hour expiry.
pub const EXPIRED_TEA: &str = "lnbc2500n1pj48ugqpp54w46h2at4w46h2at4w46h2at4w46h2at4w46h2at4w46h2at4w4ssp5gfpyysjzgfpyysjzgfpyysjzgfpyysjzgfpyysjzgfpyysjzgfpqdqjv4u8q6tjv4jzqar9vyxqrrsscqpj9qrsgqkxkslm60l0sd3uf9m9f9p6f69vp6qep8k46fvce7gc5s5287987qvf84kdmrepyep096srgmun8var9az2e2frke3256txfy290p6yqqasewy9";
/// No amount, memo "tip jar", timestamp 1700000100.
pub const TIP_JAR: &str = "lnbc1pj48utypp5ehxumnwdehxumnwdehxumnwdehxumnwdehxumnwdehxumnwdehxssp5gfpyysjzgfpyysjzgfpyysjzgfpyysjzgfpyysjzgfpyysjzgfpqdqvw35hqgr2v9eqxq8zals8sqcqpj9qrsgq697vehx4a83h2sfjsgr5d2jsukhqjzj7g0swl8z97s3ks9qdvq3xgrveqj0k47fxaadd8ryt28hd63z2sa9c6n7x56al0fexhzgg00qp7gzrg0";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
}

/// In-memory hub. Paths are relative to the `/hub` mount point.
pub struct MockHub {
    /// Direct mode: every call except `/auth` needs the latest bearer token.
    pub require_bearer: bool,
    pub logins: AtomicUsize,
    pub balance: Mutex<Value>,
    pub invoices: Mutex<Value>,
    pub pay_response: Mutex<Value>,
    login_delay: Mutex<Option<Duration>>,
    token: Mutex<Option<String>>,
    canned: Mutex<HashMap<String, Canned>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockHub {
    pub fn direct() -> Arc<Self> {
        Arc::new(Self::with_bearer(true))
    }

    pub fn delegated() -> Arc<Self> {
        Arc::new(Self::with_bearer(false))
    }

    fn with_bearer(require_bearer: bool) -> Self {
        Self {
            require_bearer,
            logins: AtomicUsize::new(0),
            balance: Mutex::new(json!(1234)),
            invoices: Mutex::new(json!([])),
            pay_response: Mutex::new(json!({
                "payment_preimage": {"type": "Buffer", "data": [1, 2, 3]},
                "payment_route": {"total_fees": 1}
            })),
            login_delay: Mutex::new(None),
            token: Mutex::new(None),
            canned: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.login_delay.lock().unwrap() = Some(delay);
    }

    /// Answer `path` with a fixed status and raw body instead of the default handler.
    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.canned_with(path, status, body, None);
    }

    pub fn respond_after(&self, path: &str, delay: Duration, body: &str) {
        self.canned_with(path, 200, body, Some(delay));
    }

    fn canned_with(&self, path: &str, status: u16, body: &str, delay: Option<Duration>) {
        let status = StatusCode::from_u16(status).expect("status");
        self.canned
            .lock()
            .unwrap()
            .insert(path.to_string(), Canned { status, body: body.to_string(), delay });
    }

    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn current_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

/// Serve `hub` on an ephemeral port. Returns the endpoint URL, e.g. `http://127.0.0.1:PORT/hub`.
pub async fn serve(hub: Arc<MockHub>) -> String {
    let app = Router::new().fallback(handle).with_state(hub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{}/hub", addr)
}

pub fn direct_connection(endpoint: &str) -> String {
    format!("lndhub://{}:{}@{}", LOGIN, PASSWORD, endpoint)
}

async fn handle(State(hub): State<Arc<MockHub>>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let path = uri.path().strip_prefix("/hub").unwrap_or(uri.path()).to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    hub.requests.lock().unwrap().push(Recorded {
        method,
        path: path.clone(),
        query: uri.query().map(String::from),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    let canned = hub.canned.lock().unwrap().get(&path).cloned();
    if let Some(canned) = canned {
        if let Some(delay) = canned.delay {
            tokio::time::sleep(delay).await;
        }
        return (canned.status, [(header::CONTENT_TYPE, "application/json")], canned.body).into_response();
    }

    if path == "/auth" {
        return login(&hub, &body).await;
    }

    if hub.require_bearer {
        let expected = hub.current_token().map(|t| format!("Bearer {}", t));
        if expected.is_none() || authorization != expected {
            return Json(json!({"error": true, "code": 1, "message": "bad auth"})).into_response();
        }
    }

    match path.as_str() {
        "/getinfo" => Json(json!({
            "alias": "mock-hub",
            "identity_pubkey": "02aabbcc",
            "block_height": 812345,
            "synced_to_chain": true,
            "num_active_channels": 3,
            "uris": ["02aabbcc@127.0.0.1:9735"]
        }))
        .into_response(),
        "/balance" => Json(json!({"BTC": {"AvailableBalance": hub.balance.lock().unwrap().clone()}})).into_response(),
        "/addinvoice" => Json(json!({
            "r_hash": {"type": "Buffer", "data": [255, 255]},
            "payment_request": COFFEE,
            "add_index": "7"
        }))
        .into_response(),
        "/payinvoice" => Json(hub.pay_response.lock().unwrap().clone()).into_response(),
        "/getuserinvoices" => Json(hub.invoices.lock().unwrap().clone()).into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": true, "code": 6, "message": "not found"}))).into_response(),
    }
}

async fn login(hub: &MockHub, body: &Value) -> Response {
    let delay = *hub.login_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if body["login"] != LOGIN || body["password"] != PASSWORD {
        return Json(json!({"error": true, "code": 1, "message": "bad auth"})).into_response();
    }
    let n = hub.logins.fetch_add(1, Ordering::SeqCst) + 1;
    let token = format!("access-{}", n);
    *hub.token.lock().unwrap() = Some(token.clone());
    Json(json!({"access_token": token, "refresh_token": format!("refresh-{}", n)})).into_response()
}
