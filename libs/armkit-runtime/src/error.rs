use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::poller::OperationStatus;
use crate::response_error::ResponseError;

/// Errors surfaced by ARM operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArmError {
    /// Transport failure; no usable response was received.
    #[error(transparent)]
    Http(armkit_http::HttpError),

    /// The service answered with an unexpected status.
    #[error(transparent)]
    Response(Box<ResponseError>),

    /// A required path parameter was empty.
    #[error("parameter {0} cannot be empty")]
    MissingParameter(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to decode response body: {0}")]
    Json(#[from] serde_json::Error),

    /// The credential could not produce a token for the request.
    #[error(transparent)]
    Credential(#[from] armkit_identity::CredentialError),

    #[error("configuration error: {0}")]
    Config(String),

    /// Polling could not proceed (malformed status, missing header).
    #[error("poller error: {0}")]
    Poller(String),

    /// A list operation was driven past its first page without a `nextLink`.
    #[error("pager error: {0}")]
    Pager(String),

    /// A long-running operation reached `Failed` or `Canceled`.
    #[error("long-running operation {status}{}", .error.as_ref().map(|e| format!(": {e}")).unwrap_or_default())]
    OperationFailed {
        status: OperationStatus,
        error: Option<ErrorDetail>,
    },

    #[error("invalid resume token: {0}")]
    ResumeToken(String),
}

impl From<armkit_http::HttpError> for ArmError {
    fn from(err: armkit_http::HttpError) -> Self {
        match err {
            armkit_http::HttpError::Auth(source) => {
                match source.downcast::<armkit_identity::CredentialError>() {
                    Ok(credential) => Self::Credential(*credential),
                    Err(other) => Self::Http(armkit_http::HttpError::Auth(other)),
                }
            }
            other => Self::Http(other),
        }
    }
}

impl From<ResponseError> for ArmError {
    fn from(err: ResponseError) -> Self {
        Self::Response(Box::new(err))
    }
}

impl ArmError {
    /// HTTP status of the failed response, if the service produced one.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Response(r) => Some(r.status),
            _ => None,
        }
    }

    /// Service error code (`x-ms-error-code` or body `error.code`).
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Response(r) => r.error_code.as_deref(),
            Self::OperationFailed {
                error: Some(detail),
                ..
            } => detail.code.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(http::StatusCode::NOT_FOUND)
    }

    /// `412 Precondition Failed`: the `If-Match` ETag no longer matches.
    #[must_use]
    pub fn is_precondition_failed(&self) -> bool {
        self.status() == Some(http::StatusCode::PRECONDITION_FAILED)
    }
}

/// ARM error payload (`{"error": {...}}` envelope contents).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(msg)) => write!(f, "{code}: {msg}"),
            (Some(code), None) => f.write_str(code),
            (None, Some(msg)) => f.write_str(msg),
            (None, None) => f.write_str("no error details"),
        }
    }
}
