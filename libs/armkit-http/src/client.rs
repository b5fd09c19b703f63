use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Method, Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::Service;
use tower::buffer::Buffer;

pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client over the tower stack assembled by [`HttpClientBuilder`].
///
/// `Clone + Send + Sync`; clones share one buffered service, so store it
/// directly rather than behind a lock.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl HttpClient {
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    #[must_use]
    pub fn transport_security(&self) -> TransportSecurity {
        self.transport_security
    }

    /// Start a request with an arbitrary method.
    ///
    /// `url` must be absolute; `http://` additionally requires
    /// [`TransportSecurity::AllowInsecureHttp`].
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            method,
            url.to_owned(),
            self.transport_security,
        )
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn head(&self, url: &str) -> RequestBuilder {
        self.request(Method::HEAD, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }
}

/// Unwrap an `HttpError` from the buffer, or report the worker as gone.
pub fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(error = %err, "buffer worker closed unexpectedly; service unavailable");
            HttpError::ServiceClosed
        }
    }
}

/// Poll the buffer once; a full buffer fails with `Overloaded` instead of waiting.
pub async fn try_acquire_buffer_slot(service: &mut BufferedService) -> Result<(), HttpError> {
    use std::task::Poll;

    let polled = std::future::poll_fn(|cx| match service.poll_ready(cx) {
        Poll::Ready(result) => Poll::Ready(Some(result)),
        Poll::Pending => Poll::Ready(None),
    })
    .await;

    match polled {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(map_buffer_error(e)),
        None => Err(HttpError::Overloaded),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{ExponentialBackoff, RetryConfig};
    use crate::error::InvalidUriKind;
    use crate::layers::CLIENT_REQUEST_ID_HEADER;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_client() -> HttpClient {
        HttpClientBuilder::new()
            .allow_insecure_http()
            .retry(None)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_json() {
        #[derive(serde::Deserialize)]
        struct Body {
            name: String,
        }

        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/resource");
            then.status(200).json_body(json!({"name": "svc1"}));
        });

        let body: Body = test_client()
            .get(&server.url("/resource"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body.name, "svc1");
    }

    #[tokio::test]
    async fn test_head_returns_headers_without_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(httpmock::Method::HEAD).path("/entity");
            then.status(200).header("etag", "\"AAAAAAAAAAA=\"");
        });

        let resp = test_client()
            .head(&server.url("/entity"))
            .send()
            .await
            .unwrap();
        m.assert();
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.header_str("etag"), Some("\"AAAAAAAAAAA=\""));
    }

    #[tokio::test]
    async fn test_query_pairs_are_appended() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/list")
                .query_param("api-version", "2024-05-01")
                .query_param("$filter", "name eq 'a b'");
            then.status(200);
        });

        let url = format!("{}?api-version=2024-05-01", server.url("/list"));
        test_client()
            .get(&url)
            .query("$filter", "name eq 'a b'")
            .send()
            .await
            .unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn test_put_json_sets_content_type() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(PUT)
                .path("/thing")
                .header("content-type", "application/json")
                .json_body(json!({"properties": {"value": 1}}));
            then.status(201);
        });

        let resp = test_client()
            .put(&server.url("/thing"))
            .json(&json!({"properties": {"value": 1}}))
            .unwrap()
            .send()
            .await
            .unwrap();
        m.assert();
        assert_eq!(resp.status(), http::StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_post_form() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("grant_type=client_credentials&scope=a%2F.default");
            then.status(200);
        });

        test_client()
            .post(&server.url("/token"))
            .form(&[("grant_type", "client_credentials"), ("scope", "a/.default")])
            .unwrap()
            .send()
            .await
            .unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn test_non_2xx_is_ok_until_checked() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not here");
        });

        let resp = test_client()
            .get(&server.url("/missing"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert!(matches!(
            resp.error_for_status(),
            Err(HttpError::HttpStatus { .. })
        ));
    }

    #[tokio::test]
    async fn test_client_request_id_and_user_agent_are_stamped() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/ids")
                .header_exists(CLIENT_REQUEST_ID_HEADER)
                .header("user-agent", "apim-test/0.1");
            then.status(200);
        });

        HttpClientBuilder::new()
            .allow_insecure_http()
            .retry(None)
            .user_agent("apim-test/0.1")
            .build()
            .unwrap()
            .get(&server.url("/ids"))
            .send()
            .await
            .unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn test_caller_request_id_is_kept() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/ids")
                .header(CLIENT_REQUEST_ID_HEADER, "fixed-id");
            then.status(200);
        });

        test_client()
            .get(&server.url("/ids"))
            .header(CLIENT_REQUEST_ID_HEADER, "fixed-id")
            .send()
            .await
            .unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn test_throttled_request_is_retried() {
        let server = MockServer::start();
        let throttled = server.mock(|when, then| {
            when.method(PATCH).path("/busy").header_missing("x-retry-attempt");
            then.status(429).header("retry-after-ms", "5");
        });
        let ok = server.mock(|when, then| {
            when.method(PATCH).path("/busy").header("x-retry-attempt", "1");
            then.status(200);
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .retry(Some(RetryConfig {
                backoff: ExponentialBackoff::fast(),
                ..RetryConfig::default()
            }))
            .build()
            .unwrap();
        let resp = client
            .patch(&server.url("/busy"))
            .body_string("{}".to_owned())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        throttled.assert_hits(1);
        ok.assert_hits(1);
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/large");
            then.status(200).body("x".repeat(4096));
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .retry(None)
            .max_body_size(1024)
            .build()
            .unwrap();
        let result = client
            .get(&server.url("/large"))
            .send()
            .await
            .unwrap()
            .bytes()
            .await;
        assert!(matches!(result, Err(HttpError::BodyTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_https_required_by_default() {
        let client = HttpClientBuilder::new().retry(None).build().unwrap();
        let err = client
            .get("http://management.example.test/")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidScheme { .. }));
    }

    #[tokio::test]
    async fn test_relative_url_rejected() {
        let err = test_client().get("/relative").send().await.unwrap_err();
        assert!(matches!(
            err,
            HttpError::InvalidUri {
                kind: InvalidUriKind::MissingAuthority,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_header_deferred_to_send() {
        let err = test_client()
            .get("http://localhost/")
            .header("bad header", "v")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeaderName(_)));
    }
}
