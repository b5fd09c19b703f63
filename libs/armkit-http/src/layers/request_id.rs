use http::{HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use uuid::Uuid;

/// Correlation header echoed back by Resource Manager in its logs.
pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// Stamps a random UUID into `x-ms-client-request-id` unless the caller set one.
///
/// Sits outside the retry layer, so a replayed request keeps its id.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientRequestIdLayer;

impl ClientRequestIdLayer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for ClientRequestIdLayer {
    type Service = ClientRequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientRequestIdService { inner }
    }
}

#[derive(Clone)]
pub struct ClientRequestIdService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ClientRequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        if !req.headers().contains_key(CLIENT_REQUEST_ID_HEADER)
            && let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string())
        {
            req.headers_mut().insert(CLIENT_REQUEST_ID_HEADER, value);
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct CaptureId {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Service<Request<Full<Bytes>>> for CaptureId {
        type Response = Response<Full<Bytes>>;
        type Error = std::convert::Infallible;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
            if let Some(v) = req.headers().get(CLIENT_REQUEST_ID_HEADER) {
                self.seen.lock().unwrap().push(v.to_str().unwrap().to_owned());
            }
            std::future::ready(Ok(Response::new(Full::new(Bytes::new()))))
        }
    }

    fn req() -> Request<Full<Bytes>> {
        Request::get("https://management.azure.com/")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_uuid_per_call() {
        let capture = CaptureId::default();
        let svc = ClientRequestIdLayer::new().layer(capture.clone());
        svc.clone().oneshot(req()).await.unwrap();
        svc.oneshot(req()).await.unwrap();

        let seen = capture.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[0], seen[1]);
        assert!(Uuid::parse_str(&seen[0]).is_ok());
    }

    #[tokio::test]
    async fn test_caller_id_preserved() {
        let capture = CaptureId::default();
        let svc = ClientRequestIdLayer::new().layer(capture.clone());
        let mut r = req();
        r.headers_mut()
            .insert(CLIENT_REQUEST_ID_HEADER, HeaderValue::from_static("abc"));
        svc.oneshot(r).await.unwrap();
        assert_eq!(capture.seen.lock().unwrap().as_slice(), ["abc"]);
    }
}
