//! Error types for the gateway supervisor and API client.

use thiserror::Error;

/// Errors that can occur when running or talking to the gateway.
#[derive(Debug, Error)]
pub enum NcmApiError {
    /// The gateway process could not be started (binary missing, permission
    /// denied, empty command line).
    #[error("failed to spawn gateway `{command}`: {source}")]
    Spawn {
        /// The program that was being executed.
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A stop was requested for a process that no longer exists.
    ///
    /// Usually harmless: the gateway may have exited on its own.
    #[error("no such process: {pid}")]
    NoSuchProcess {
        /// The process id that was signalled.
        pid: u32,
    },

    /// Sending the termination signal failed for a reason other than the
    /// process being gone (e.g. `EPERM`).
    #[error("failed to signal process {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    /// The gateway did not accept connections before the readiness deadline.
    #[error("gateway at {addr} not ready after {waited_ms} ms")]
    NotReady { addr: String, waited_ms: u128 },

    /// The gateway answered with a status outside `200..=299` while
    /// `raise_for_status` is enabled.
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body, useful because the gateway puts its own
        /// `code`/`msg` envelope there.
        body: String,
    },

    /// HTTP transport error (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic dispatch was asked for an endpoint without one of its
    /// required parameters.
    #[error("endpoint `{endpoint}` requires parameter `{param}`")]
    MissingParam {
        endpoint: &'static str,
        param: &'static str,
    },

    /// Generic dispatch was asked for a name that is not in the table.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// A response lacked a field a helper needs (e.g. `data.unikey`).
    #[error("unexpected response: missing `{0}`")]
    UnexpectedResponse(&'static str),

    /// The QR code image returned by the gateway could not be decoded.
    #[error("QR image error: {0}")]
    QrImage(String),

    /// File I/O error (config read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for other errors (e.g. missing config directory).
    #[error("{0}")]
    Other(String),
}

impl NcmApiError {
    /// Whether this error only says the target process was already gone.
    pub fn is_no_such_process(&self) -> bool {
        matches!(self, Self::NoSuchProcess { .. })
    }

    /// HTTP status carried by [`NcmApiError::HttpStatus`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for NcmApiError {
    fn from(e: base64::DecodeError) -> Self {
        Self::QrImage(format!("base64: {e}"))
    }
}

impl From<image::ImageError> for NcmApiError {
    fn from(e: image::ImageError) -> Self {
        Self::QrImage(e.to_string())
    }
}

/// Convenience alias for `Result<T, NcmApiError>`.
pub type Result<T> = std::result::Result<T, NcmApiError>;
