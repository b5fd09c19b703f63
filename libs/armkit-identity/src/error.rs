use thiserror::Error;

/// Failures obtaining a token.
///
/// No variant ever carries a secret or an access token in its message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CredentialError {
    /// Transport failure or non-2xx answer from the token endpoint.
    /// Response bodies are not included.
    #[error("{0}")]
    Http(String),

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("unsupported token type: {0}")]
    UnsupportedTokenType(String),

    #[error("credential configuration error: {0}")]
    Config(String),

    /// A token exists but cannot be used right now (expired, refresh pending).
    #[error("token unavailable: {0}")]
    Unavailable(String),
}

impl CredentialError {
    /// Describe a transport failure without leaking body content.
    pub(crate) fn from_http(e: &armkit_http::HttpError, context: &str) -> Self {
        use armkit_http::HttpError;

        let msg = match e {
            HttpError::HttpStatus { status, .. } => format!("{context} HTTP {status}"),
            HttpError::Json(err) => format!("{context} JSON parse failed: {err}"),
            HttpError::Timeout(d) => format!("{context} request timed out after {d:?}"),
            HttpError::DeadlineExceeded(d) => {
                format!("{context} total deadline exceeded after {d:?}")
            }
            HttpError::Transport(err) => format!("{context} transport error: {err}"),
            HttpError::Tls(err) => format!("{context} TLS error: {err}"),
            HttpError::BodyTooLarge { limit, actual } => {
                format!("{context} response too large: limit {limit} bytes, got {actual} bytes")
            }
            HttpError::Overloaded => format!("{context} request rejected: service overloaded"),
            HttpError::ServiceClosed => format!("{context} service unavailable"),
            HttpError::InvalidUri { url, reason, .. } => {
                format!("{context} invalid URL '{url}': {reason}")
            }
            HttpError::InvalidScheme { scheme, reason } => {
                format!("{context} invalid scheme '{scheme}': {reason}")
            }
            // Form bodies and headers may contain the secret
            _ => format!("{context} request failed"),
        };
        Self::Http(msg)
    }
}
