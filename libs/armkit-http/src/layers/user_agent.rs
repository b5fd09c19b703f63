use crate::error::HttpError;
use http::{HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Sets `User-Agent` on requests that do not carry one.
#[derive(Clone)]
pub struct UserAgentLayer {
    user_agent: HeaderValue,
}

impl UserAgentLayer {
    /// # Errors
    /// `HttpError::InvalidHeaderValue` if `user_agent` is not a valid header value
    pub fn try_new(user_agent: impl AsRef<str>) -> Result<Self, HttpError> {
        let user_agent = HeaderValue::from_str(user_agent.as_ref())?;
        Ok(Self { user_agent })
    }
}

impl<S> Layer<S> for UserAgentLayer {
    type Service = UserAgentService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UserAgentService {
            inner,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Clone)]
pub struct UserAgentService<S> {
    inner: S,
    user_agent: HeaderValue,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for UserAgentService<S>
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
        if !req.headers().contains_key(http::header::USER_AGENT) {
            req.headers_mut()
                .insert(http::header::USER_AGENT, self.user_agent.clone());
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct CaptureUa {
        seen: Arc<Mutex<Option<HeaderValue>>>,
    }

    impl Service<Request<Full<Bytes>>> for CaptureUa {
        type Response = Response<Full<Bytes>>;
        type Error = HttpError;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
            *self.seen.lock().unwrap() = req.headers().get(http::header::USER_AGENT).cloned();
            std::future::ready(Ok(Response::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::new()))
                .unwrap()))
        }
    }

    #[tokio::test]
    async fn test_user_agent_added() {
        let capture = CaptureUa::default();
        let svc = UserAgentLayer::try_new("apim-cli/0.1").unwrap().layer(capture.clone());
        let req = Request::get("https://management.azure.com/")
            .body(Full::new(Bytes::new()))
            .unwrap();
        svc.oneshot(req).await.unwrap();
        assert_eq!(
            capture.seen.lock().unwrap().as_ref().unwrap(),
            "apim-cli/0.1"
        );
    }

    #[tokio::test]
    async fn test_existing_user_agent_kept() {
        let capture = CaptureUa::default();
        let svc = UserAgentLayer::try_new("apim-cli/0.1").unwrap().layer(capture.clone());
        let req = Request::get("https://management.azure.com/")
            .header(http::header::USER_AGENT, "custom/2.0")
            .body(Full::new(Bytes::new()))
            .unwrap();
        svc.oneshot(req).await.unwrap();
        assert_eq!(capture.seen.lock().unwrap().as_ref().unwrap(), "custom/2.0");
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        assert!(UserAgentLayer::try_new("bad\x00agent").is_err());
    }
}
