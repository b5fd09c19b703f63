use std::fmt;

use armkit_http::HttpResponse;
use bytes::Bytes;
use http::{Method, StatusCode};

use crate::error::ArmError;

const RULE: &str =
    "--------------------------------------------------------------------------------";
const ERROR_CODE_HEADER: &str = "x-ms-error-code";

/// Non-success response from Resource Manager.
///
/// `Display` renders a multi-line report: request line, status, error code
/// and the (pretty-printed) body.
#[derive(Clone, Debug)]
pub struct ResponseError {
    pub status: StatusCode,
    /// `x-ms-error-code`, else `error.code` or `code` from the body
    pub error_code: Option<String>,
    pub method: Method,
    pub url: String,
    pub raw_body: Bytes,
}

impl ResponseError {
    /// Consume `response` and capture it as an error.
    pub async fn from_response(method: Method, url: &str, response: HttpResponse) -> Self {
        let status = response.status();
        let header_code = response
            .header_str(ERROR_CODE_HEADER)
            .filter(|c| !c.is_empty())
            .map(ToOwned::to_owned);
        let raw_body = read_error_body(response).await;
        let error_code = header_code.or_else(|| code_from_body(&raw_body));

        Self {
            status,
            error_code,
            method,
            url: url.to_owned(),
            raw_body,
        }
    }

    /// Body `error` object, if the payload follows the ARM envelope.
    #[must_use]
    pub fn detail(&self) -> Option<crate::ErrorDetail> {
        let value: serde_json::Value = serde_json::from_slice(&self.raw_body).ok()?;
        serde_json::from_value(value.get("error")?.clone()).ok()
    }
}

async fn read_error_body(response: HttpResponse) -> Bytes {
    match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "failed to read error response body");
            Bytes::new()
        }
    }
}

fn code_from_body(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .or_else(|| value.get("code"))
        .and_then(serde_json::Value::as_str)
        .filter(|c| !c.is_empty())
        .map(ToOwned::to_owned)
}

fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.method, strip_query(&self.url))?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "RESPONSE {}: {}", self.status.as_u16(), self.status)?;
        match &self.error_code {
            Some(code) => writeln!(f, "ERROR CODE: {code}")?,
            None => writeln!(f, "ERROR CODE UNAVAILABLE")?,
        }
        writeln!(f, "{RULE}")?;

        if self.raw_body.is_empty() {
            writeln!(f, "Response contained no body")?;
        } else if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&self.raw_body)
            && let Ok(pretty) = serde_json::to_string_pretty(&value)
        {
            writeln!(f, "{pretty}")?;
        } else {
            writeln!(f, "{}", String::from_utf8_lossy(&self.raw_body))?;
        }
        writeln!(f, "{RULE}")
    }
}

impl std::error::Error for ResponseError {}

/// Pass `response` through when its status is one of `expected`; otherwise
/// turn it into [`ArmError::Response`].
///
/// # Errors
/// [`ArmError::Response`] for any other status.
pub async fn ensure_status(
    method: &Method,
    url: &str,
    response: HttpResponse,
    expected: &[StatusCode],
) -> Result<HttpResponse, ArmError> {
    if expected.contains(&response.status()) {
        return Ok(response);
    }
    let err = ResponseError::from_response(method.clone(), url, response).await;
    tracing::debug!(
        method = %err.method,
        status = err.status.as_u16(),
        error_code = err.error_code.as_deref().unwrap_or(""),
        "unexpected response status"
    );
    Err(err.into())
}
