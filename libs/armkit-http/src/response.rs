use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::time::{Duration, SystemTime};

/// Maximum body preview kept in [`HttpError::HttpStatus`] (8 KiB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

const RETRY_AFTER_MS: &str = "retry-after-ms";
const X_MS_RETRY_AFTER_MS: &str = "x-ms-retry-after-ms";

/// Read the server's retry hint.
///
/// Checked in order, first parseable wins:
/// 1. `retry-after-ms` (milliseconds)
/// 2. `x-ms-retry-after-ms` (milliseconds)
/// 3. `Retry-After` (seconds, or an HTTP-date in the future)
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    for name in [RETRY_AFTER_MS, X_MS_RETRY_AFTER_MS] {
        if let Some(ms) = header_str(headers, name).and_then(|v| v.trim().parse::<u64>().ok()) {
            return Some(Duration::from_millis(ms));
        }
    }

    let value = header_str(headers, http::header::RETRY_AFTER.as_str())?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let at = httpdate::parse_http_date(value).ok()?;
    at.duration_since(SystemTime::now()).ok()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Boxed response body, decompressed when the server used gzip/br/deflate.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Response returned by [`RequestBuilder::send`](crate::RequestBuilder::send).
///
/// Every body reader enforces the client's `max_body_size`.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Header value as UTF-8, `None` if absent or not valid text
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        header_str(self.inner.headers(), name)
    }

    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Fail on non-2xx without reading the body.
    ///
    /// # Errors
    ///
    /// `HttpError::HttpStatus` with an empty preview for non-2xx statuses.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.inner.status().is_success() {
            return Ok(self);
        }
        Err(HttpError::HttpStatus {
            status: self.inner.status(),
            body_preview: String::new(),
            content_type: header_str(self.inner.headers(), http::header::CONTENT_TYPE.as_str())
                .map(ToOwned::to_owned),
            retry_after: parse_retry_after(self.inner.headers()),
        })
    }

    /// Read the body regardless of status.
    ///
    /// # Errors
    /// `HttpError::BodyTooLarge` past the limit, `Transport` on read failure.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_body_limited(self.inner, self.max_body_size).await
    }

    /// Read the body, failing on non-2xx with a preview of the error body.
    ///
    /// # Errors
    /// `HttpError::HttpStatus` for non-2xx, `BodyTooLarge` past the limit.
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        checked_body(self.inner, self.max_body_size).await
    }

    /// # Errors
    /// As [`checked_bytes`](Self::checked_bytes), plus `HttpError::Json`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = checked_body(self.inner, self.max_body_size).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Lossy UTF-8 body with status check.
    ///
    /// # Errors
    /// As [`checked_bytes`](Self::checked_bytes).
    pub async fn text(self) -> Result<String, HttpError> {
        let body = checked_body(self.inner, self.max_body_size).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

async fn checked_body(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<Bytes, HttpError> {
    let status = response.status();
    if status.is_success() {
        return read_body_limited(response, max_body_size).await;
    }

    let content_type = header_str(response.headers(), http::header::CONTENT_TYPE.as_str())
        .map(ToOwned::to_owned);
    let retry_after = parse_retry_after(response.headers());

    // An oversized error body must not mask the status itself.
    let preview_limit = max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
    let body_preview = match read_body_limited(response, preview_limit).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
        Err(e) => return Err(e),
    };

    Err(HttpError::HttpStatus {
        status,
        body_preview,
        content_type,
        retry_after,
    })
}

/// Collect a body, counting decoded bytes against `limit`.
pub async fn read_body_limited(
    response: Response<ResponseBody>,
    limit: usize,
) -> Result<Bytes, HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut collected = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let total = collected.len() + chunk.len();
            if total > limit {
                return Err(HttpError::BodyTooLarge {
                    limit,
                    actual: total,
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http_body_util::Full;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn response(status: u16, body: &'static [u8]) -> HttpResponse {
        let body: ResponseBody = Full::new(Bytes::from_static(body))
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })
            .boxed();
        HttpResponse {
            inner: Response::builder().status(status).body(body).unwrap(),
            max_body_size: 64,
        }
    }

    #[test]
    fn test_retry_after_seconds() {
        let h = headers(&[("retry-after", "7")]);
        assert_eq!(parse_retry_after(&h), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_retry_after_ms_takes_precedence() {
        let h = headers(&[
            ("retry-after", "30"),
            ("x-ms-retry-after-ms", "250"),
            ("retry-after-ms", "10"),
        ]);
        assert_eq!(parse_retry_after(&h), Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_x_ms_retry_after_ms_used_when_plain_ms_missing() {
        let h = headers(&[("retry-after", "30"), ("x-ms-retry-after-ms", "250")]);
        assert_eq!(parse_retry_after(&h), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_unparseable_ms_falls_through_to_retry_after() {
        let h = headers(&[("retry-after-ms", "soon"), ("retry-after", "2")]);
        assert_eq!(parse_retry_after(&h), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_retry_after_http_date_in_future() {
        let at = SystemTime::now() + Duration::from_secs(120);
        let h = headers(&[("retry-after", &httpdate::fmt_http_date(at))]);
        let parsed = parse_retry_after(&h).unwrap();
        assert!(parsed > Duration::from_secs(100));
        assert!(parsed <= Duration::from_secs(120));
    }

    #[test]
    fn test_retry_after_rejects_past_date_and_negative() {
        let h = headers(&[("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT")]);
        assert_eq!(parse_retry_after(&h), None);
        let h = headers(&[("retry-after", "-5")]);
        assert_eq!(parse_retry_after(&h), None);
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_checked_bytes_reports_status_with_preview() {
        let err = response(409, b"{\"error\":{\"code\":\"Conflict\"}}")
            .checked_bytes()
            .await
            .unwrap_err();
        match err {
            HttpError::HttpStatus {
                status,
                body_preview,
                ..
            } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert!(body_preview.contains("Conflict"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bytes_enforces_limit() {
        let big: &'static [u8] = &[b'x'; 65];
        let err = response(200, big).bytes().await.unwrap_err();
        assert!(matches!(
            err,
            HttpError::BodyTooLarge {
                limit: 64,
                actual: 65
            }
        ));
    }

    #[test]
    fn test_header_str() {
        let body: ResponseBody = Full::new(Bytes::new())
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })
            .boxed();
        let resp = HttpResponse {
            inner: Response::builder()
                .status(200)
                .header("etag", "\"AAAA\"")
                .body(body)
                .unwrap(),
            max_body_size: 64,
        };
        assert_eq!(resp.header_str("ETag"), Some("\"AAAA\""));
        assert_eq!(resp.header_str("location"), None);
    }
}
