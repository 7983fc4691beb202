//! HTTP client bound to one running gateway.
//!
//! Every call is a plain `GET {base_url}{path}?{args}` and the gateway
//! answers with JSON:
//!
//! ```json
//! { "code": 200, ...endpoint-specific fields... }
//! ```
//!
//! The body is returned as an untyped [`serde_json::Value`]; the client never
//! validates the envelope. Login state lives in the session's cookie store
//! and is replayed on later calls automatically.
//!
//! # Lifetime
//!
//! An [`ApiClient`] logs out when it is closed. [`ApiClient::close`] does it
//! explicitly, and `Drop` does it on every other exit path (early `?`
//! return, panic unwinding). Closing is idempotent and never fails: a logout
//! error is logged and dropped.
//!
//! # Threads
//!
//! `ApiClient` is `Send + Sync`. Calls from several threads share one
//! connection pool and one cookie jar, which `reqwest::blocking::Client`
//! synchronizes internally. Calls are not otherwise ordered.

use crate::config::ApiConfig;
use crate::error::{NcmApiError, Result};
use crate::types::{Args, Scalar};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const USER_AGENT: &str = concat!("ncmapi/", env!("CARGO_PKG_VERSION"));

/// Blocking client for the gateway's REST API.
///
/// Endpoint methods live in separate modules (`auth`, `track`, `playlist`,
/// `user`, `endpoints`) as `impl ApiClient` blocks.
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    raise_for_status: bool,
    add_timestamp: bool,
    timeout: Option<Duration>,
    closed: bool,
}

/// Builder for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    base_url: String,
    raise_for_status: bool,
    add_timestamp: bool,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Raise [`NcmApiError::HttpStatus`] on non-2xx responses. Default `true`.
    #[must_use]
    pub fn raise_for_status(mut self, yes: bool) -> Self {
        self.raise_for_status = yes;
        self
    }

    /// Add `timestamp` to every call, not only auth calls. Default `false`.
    #[must_use]
    pub fn add_timestamp(mut self, yes: bool) -> Self {
        self.add_timestamp = yes;
        self
    }

    /// Default per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;
        Ok(ApiClient {
            http,
            base_url: self.base_url.trim_end_matches('/').to_owned(),
            raise_for_status: self.raise_for_status,
            add_timestamp: self.add_timestamp,
            timeout: self.timeout,
            closed: false,
        })
    }
}

impl ApiClient {
    /// Client for a gateway at `http://{host}:{port}` with default settings.
    pub fn new(port: u16, host: &str) -> Result<Self> {
        Self::builder()
            .base_url(format!("http://{host}:{port}"))
            .build()
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::builder()
            .base_url(config.base_url())
            .raise_for_status(config.raise_for_status)
            .add_timestamp(config.add_timestamp)
            .timeout(config.timeout())
            .build()
    }

    pub fn builder() -> ApiClientBuilder {
        let defaults = ApiConfig::default();
        ApiClientBuilder {
            base_url: defaults.base_url(),
            raise_for_status: defaults.raise_for_status,
            add_timestamp: defaults.add_timestamp,
            timeout: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Call `path` with `args` and return the parsed JSON body.
    ///
    /// `force_timestamp` adds a `timestamp` argument even when the client's
    /// `add_timestamp` flag is off. Auth endpoints use it so the gateway does
    /// not serve a cached answer.
    pub fn call_api(&self, path: &str, args: Args, force_timestamp: bool) -> Result<Value> {
        self.dispatch(path, args, force_timestamp, self.timeout)
    }

    /// [`call_api`](Self::call_api) with a timeout for this call only.
    pub fn call_api_with_timeout(
        &self,
        path: &str,
        args: Args,
        force_timestamp: bool,
        timeout: Duration,
    ) -> Result<Value> {
        self.dispatch(path, args, force_timestamp, Some(timeout))
    }

    /// Log out and mark the client closed. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.logout(Args::new()) {
            log::warn!("logout on close failed: {e}");
        }
    }

    /// Full request URL for a call, after timestamp injection.
    pub(crate) fn build_url(&self, path: &str, mut args: Args, force_timestamp: bool) -> String {
        if self.add_timestamp || force_timestamp {
            args.insert("timestamp", Scalar::Int(now_millis()));
        }
        let query = args.to_query_string();
        if query.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{query}", self.base_url)
        }
    }

    fn dispatch(
        &self,
        path: &str,
        args: Args,
        force_timestamp: bool,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let url = self.build_url(path, args, force_timestamp);
        let mut req = self.http.get(&url);
        if let Some(t) = timeout {
            req = req.timeout(t);
        }

        let resp = req.send()?;
        let status = resp.status();
        log::debug!("GET {path} -> {status}");

        let body = resp.text()?;
        if self.raise_for_status && !status.is_success() {
            return Err(NcmApiError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl Drop for ApiClient {
    fn drop(&mut self) {
        self.close();
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}
