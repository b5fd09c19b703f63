use std::time::Duration;
use thiserror::Error;

/// Why a URL was rejected before a request was built.
///
/// Match on this rather than on the `reason` text of [`HttpError::InvalidUri`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    /// Malformed URL syntax
    ParseError,
    /// No host component
    MissingAuthority,
    /// No `http`/`https` scheme
    MissingScheme,
}

/// Errors produced by the transport stack.
///
/// A response with a non-2xx status is *not* an error at this level: `send()`
/// returns it as `Ok` and callers decide. `HttpStatus` only appears when a
/// caller asks for it via `error_for_status()` or one of the checked readers.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// A single attempt ran past `request_timeout`
    #[error("request attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The whole call, retries included, ran past `total_timeout`
    #[error("operation deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Raised by an authorization layer that could not obtain a credential.
    /// Never retried by the transport.
    #[error("authorization failed: {0}")]
    Auth(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("response body too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
        content_type: Option<String>,
        /// Server retry hint, if one was sent
        retry_after: Option<Duration>,
    },

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("form encoding failed: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// Concurrency limit or request buffer is full
    #[error("service overloaded: concurrency limit reached")]
    Overloaded,

    /// The buffer worker is gone
    #[error("service unavailable: internal failure")]
    ServiceClosed,

    /// `reason` is diagnostic text only; match on `kind`.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    #[error("URL scheme '{scheme}' not allowed: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}
