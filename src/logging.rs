//! Logging setup for the wallet and the `lndhub` CLI.
//!
//! Filter precedence: `LNDHUB_LOG`, then `RUST_LOG`, then [`DEFAULT_DIRECTIVES`].
//! HTTP stack noise (hyper, reqwest, rustls) stays at `warn` unless asked for.

use tracing_subscriber::{fmt, EnvFilter};

/// Set to `1` for JSON log lines instead of the pretty format.
pub const ENV_LOG_JSON: &str = "LNDHUB_LOG_JSON";
/// Filter directives for this crate's logs, checked before `RUST_LOG`.
pub const ENV_LOG: &str = "LNDHUB_LOG";

pub const DEFAULT_DIRECTIVES: &str = "warn,lndhub_wallet=info,lndhub=info";
const VERBOSE_DIRECTIVES: &str = "warn,lndhub_wallet=debug,lndhub=debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub directives: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { directives: DEFAULT_DIRECTIVES.to_string(), json: false }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            directives: pick_directives(std::env::var(ENV_LOG).ok(), std::env::var(EnvFilter::DEFAULT_ENV).ok()),
            json: std::env::var(ENV_LOG_JSON).map(|value| value == "1").unwrap_or(false),
        }
    }

    pub fn with_json(mut self, json: bool) -> Self { self.json = json; self }

    /// Debug-level wallet logs. Ignored when the filter came from the environment.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        if verbose && self.directives == DEFAULT_DIRECTIVES {
            self.directives = VERBOSE_DIRECTIVES.to_string();
        }
        self
    }
}

fn pick_directives(lndhub_log: Option<String>, rust_log: Option<String>) -> String {
    lndhub_log
        .into_iter()
        .chain(rust_log)
        .map(|d| d.trim().to_string())
        .find(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string())
}

/// Install the global subscriber from the environment. Logs go to stderr so
/// stdout stays machine-readable.
pub fn init_logging() {
    init_logging_with(&LogConfig::from_env());
}

pub fn init_logging_with(config: &LogConfig) {
    let env_filter = EnvFilter::try_new(&config.directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };
}
