use crate::config::{ExponentialBackoff, RetryConfig, RetryTrigger};
use crate::error::HttpError;
use crate::response::{ResponseBody, parse_retry_after};
use bytes::Bytes;
use http::{HeaderValue, Request, Response};
use http_body_util::{BodyExt, Full};
use rand::Rng;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::Instant;
use tower::{Layer, Service, ServiceExt};

/// Attempt number (1-based) stamped on every replayed request.
pub const RETRY_ATTEMPT_HEADER: &str = "X-Retry-Attempt";

/// Retries throttled and transient failures with exponential backoff.
#[derive(Clone)]
pub struct RetryLayer {
    config: RetryConfig,
    total_timeout: Option<Duration>,
}

impl RetryLayer {
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            total_timeout: None,
        }
    }

    /// `total_timeout` bounds every attempt and sleep of a single call.
    #[must_use]
    pub fn with_total_timeout(config: RetryConfig, total_timeout: Option<Duration>) -> Self {
        Self {
            config,
            total_timeout,
        }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryService {
            inner,
            config: self.config.clone(),
            total_timeout: self.total_timeout,
        }
    }
}

/// Service produced by [`RetryLayer`].
///
/// Retries on `Err(Transport | Timeout)` and on responses whose status is in
/// `retry_on`. When retries run out the last response is returned as `Ok`,
/// whatever its status.
#[derive(Clone)]
pub struct RetryService<S> {
    inner: S,
    config: RetryConfig,
    total_timeout: Option<Duration>,
}

impl<S> Service<Request<Full<Bytes>>> for RetryService<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<ResponseBody>, Error = HttpError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = HttpError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
        // Consume the instance that was poll_ready'd
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let config = self.config.clone();
        let deadline = self.total_timeout.map(|t| (Instant::now() + t, t));

        let (parts, body) = req.into_parts();
        let version = parts.version;
        let extensions = parts.extensions.clone();
        let parts = std::sync::Arc::new(parts);

        Box::pin(async move {
            let method = parts.method.clone();
            let host = parts
                .uri
                .authority()
                .map_or_else(|| "unknown".to_owned(), ToString::to_string);
            let request_id = parts
                .headers
                .get(super::CLIENT_REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(String::from);

            let mut attempt = 0usize;
            loop {
                if let Some((at, total)) = deadline
                    && Instant::now() >= at
                {
                    return Err(HttpError::DeadlineExceeded(total));
                }

                let mut req = Request::from_parts((*parts).clone(), body.clone());
                *req.version_mut() = version;
                *req.extensions_mut() = extensions.clone();
                if attempt > 0
                    && let Ok(value) = HeaderValue::try_from(attempt.to_string())
                {
                    req.headers_mut().insert(RETRY_ATTEMPT_HEADER, value);
                }

                let mut svc = inner.clone();
                svc.ready().await?;

                let exhausted = attempt >= config.max_retries;
                match svc.call(req).await {
                    Ok(resp) => {
                        let status = resp.status().as_u16();
                        let trigger = RetryTrigger::Status(status);
                        if exhausted || !config.should_retry(trigger) {
                            return Ok(resp);
                        }

                        let hint = if config.ignore_retry_after {
                            None
                        } else {
                            parse_retry_after(resp.headers())
                        };
                        let delay = hint.unwrap_or_else(|| calculate_backoff(&config.backoff, attempt));

                        if should_drain(&resp, config.retry_response_drain_limit)
                            && let Err(e) =
                                drain_response_body(resp, config.retry_response_drain_limit).await
                        {
                            tracing::debug!(error = %e, "failed to drain response before retry");
                        }

                        let delay = clamp_to_deadline(delay, deadline)?;
                        tracing::debug!(
                            retry = attempt + 1,
                            max_retries = config.max_retries,
                            status,
                            method = %method,
                            host = %host,
                            client_request_id = ?request_id,
                            backoff_ms = delay.as_millis(),
                            retry_after_used = hint.is_some(),
                            "retrying request after status code"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    Err(err) => {
                        let trigger = retry_trigger(&err);
                        if exhausted || !config.should_retry(trigger) {
                            return Err(err);
                        }

                        let delay =
                            clamp_to_deadline(calculate_backoff(&config.backoff, attempt), deadline)?;
                        tracing::debug!(
                            retry = attempt + 1,
                            max_retries = config.max_retries,
                            error = %err,
                            trigger = ?trigger,
                            method = %method,
                            host = %host,
                            client_request_id = ?request_id,
                            backoff_ms = delay.as_millis(),
                            "retrying request after error"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
                attempt += 1;
            }
        })
    }
}

fn clamp_to_deadline(
    delay: Duration,
    deadline: Option<(Instant, Duration)>,
) -> Result<Duration, HttpError> {
    let Some((at, total)) = deadline else {
        return Ok(delay);
    };
    let remaining = at.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(HttpError::DeadlineExceeded(total));
    }
    Ok(delay.min(remaining))
}

/// Skip draining bodies that announce more than `limit` bytes; the
/// connection is simply not reused.
fn should_drain(resp: &Response<ResponseBody>, limit: usize) -> bool {
    resp.headers()
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .is_none_or(|len| len <= limit as u64)
}

/// Read and discard up to `limit` decoded bytes so HTTP/1.1 connections
/// return to the pool.
async fn drain_response_body(
    response: Response<ResponseBody>,
    limit: usize,
) -> Result<(), HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut drained = 0usize;
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            drained += chunk.len();
            if drained >= limit {
                break;
            }
        }
    }
    Ok(())
}

fn retry_trigger(err: &HttpError) -> RetryTrigger {
    match err {
        HttpError::Transport(_) => RetryTrigger::TransportError,
        HttpError::Timeout(_) => RetryTrigger::Timeout,
        _ => RetryTrigger::NonRetryable,
    }
}

/// Delay before retry number `attempt + 1`.
///
/// Non-finite or negative inputs are sanitized instead of panicking, and the
/// jittered result never exceeds `backoff.max`.
pub fn calculate_backoff(backoff: &ExponentialBackoff, attempt: usize) -> Duration {
    const MAX_BACKOFF_SECS: f64 = 86400.0;

    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let multiplier = if backoff.multiplier.is_finite() && backoff.multiplier >= 0.0 {
        backoff.multiplier
    } else {
        1.0
    };
    let initial_secs = backoff.initial.as_secs_f64();
    let max_secs = backoff.max.as_secs_f64().min(MAX_BACKOFF_SECS);

    let base = initial_secs * multiplier.powi(exponent);
    let clamped = if base.is_finite() {
        base.clamp(0.0, max_secs)
    } else {
        max_secs
    };
    let duration = Duration::from_secs_f64(clamped);

    let duration = if backoff.jitter {
        let factor = rand::rng().random_range(0.0..=0.25);
        duration + duration.mul_f64(factor)
    } else {
        duration
    };
    duration.min(Duration::from_secs_f64(max_secs))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn make_response_body(data: &[u8]) -> ResponseBody {
        Full::new(Bytes::from(data.to_vec()))
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })
            .boxed()
    }

    enum Step {
        Status(u16, &'static [(&'static str, &'static str)]),
        Reset,
        Unauthorized,
    }

    /// Plays back a fixed script and records the attempt header of each call.
    #[derive(Clone)]
    struct ScriptedService {
        script: Arc<Mutex<VecDeque<Step>>>,
        seen: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl ScriptedService {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                script: Arc::new(Mutex::new(steps.into())),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Service<Request<Full<Bytes>>> for ScriptedService {
        type Response = Response<ResponseBody>;
        type Error = HttpError;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

        fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
            self.seen.lock().unwrap().push(
                req.headers()
                    .get(RETRY_ATTEMPT_HEADER)
                    .map(|v| v.to_str().unwrap().to_owned()),
            );
            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Step::Status(200, &[]));
            Box::pin(async move {
                match step {
                    Step::Status(code, headers) => {
                        let mut builder = Response::builder().status(code);
                        for (k, v) in headers {
                            builder = builder.header(*k, *v);
                        }
                        Ok(builder.body(make_response_body(b"{}")).unwrap())
                    }
                    Step::Reset => Err(HttpError::Transport(Box::new(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "connection reset",
                    )))),
                    Step::Unauthorized => Err(HttpError::Auth("no token".into())),
                }
            })
        }
    }

    fn request(method: Method) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri("https://management.azure.com/subscriptions")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn fast_config() -> RetryConfig {
        RetryConfig {
            backoff: ExponentialBackoff::fast(),
            ..RetryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_success_is_not_retried() {
        let svc = ScriptedService::new(vec![Step::Status(200, &[])]);
        let mut retry = RetryLayer::new(fast_config()).layer(svc.clone());
        let resp = retry.call(request(Method::GET)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(svc.calls(), 1);
    }

    #[tokio::test]
    async fn test_post_is_retried_on_503() {
        let svc = ScriptedService::new(vec![Step::Status(503, &[]), Step::Status(202, &[])]);
        let mut retry = RetryLayer::new(fast_config()).layer(svc.clone());
        let resp = retry.call(request(Method::POST)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(svc.calls(), 2);
    }

    #[tokio::test]
    async fn test_attempt_header_counts_retries() {
        let svc = ScriptedService::new(vec![
            Step::Status(500, &[]),
            Step::Status(502, &[]),
            Step::Status(200, &[]),
        ]);
        let mut retry = RetryLayer::new(fast_config()).layer(svc.clone());
        retry.call(request(Method::PUT)).await.unwrap();
        let seen = svc.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![None, Some("1".to_owned()), Some("2".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_last_response() {
        let svc = ScriptedService::new(vec![
            Step::Status(429, &[]),
            Step::Status(429, &[]),
            Step::Status(429, &[]),
        ]);
        let config = RetryConfig {
            max_retries: 2,
            ..fast_config()
        };
        let mut retry = RetryLayer::new(config).layer(svc.clone());
        let resp = retry.call(request(Method::GET)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(svc.calls(), 3);
    }

    #[tokio::test]
    async fn test_client_errors_pass_through() {
        for code in [400, 404, 409, 412] {
            let svc = ScriptedService::new(vec![Step::Status(code, &[])]);
            let mut retry = RetryLayer::new(fast_config()).layer(svc.clone());
            let resp = retry.call(request(Method::DELETE)).await.unwrap();
            assert_eq!(resp.status().as_u16(), code);
            assert_eq!(svc.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_retried() {
        let svc = ScriptedService::new(vec![Step::Reset, Step::Status(200, &[])]);
        let mut retry = RetryLayer::new(fast_config()).layer(svc.clone());
        assert!(retry.call(request(Method::PATCH)).await.is_ok());
        assert_eq!(svc.calls(), 2);
    }

    #[tokio::test]
    async fn test_auth_error_is_not_retried() {
        let svc = ScriptedService::new(vec![Step::Unauthorized]);
        let mut retry = RetryLayer::new(fast_config()).layer(svc.clone());
        let err = retry.call(request(Method::GET)).await.unwrap_err();
        assert!(matches!(err, HttpError::Auth(_)));
        assert_eq!(svc.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_ms_hint_is_honoured() {
        let svc = ScriptedService::new(vec![
            Step::Status(429, &[("retry-after-ms", "1500")]),
            Step::Status(200, &[]),
        ]);
        let config = RetryConfig {
            backoff: ExponentialBackoff::new(Duration::from_secs(30), Duration::from_secs(60)),
            ..RetryConfig::default()
        };
        let mut retry = RetryLayer::new(config).layer(svc.clone());
        let start = Instant::now();
        retry.call(request(Method::GET)).await.unwrap();
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(1500));
        assert!(waited < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_timeout_stops_retry_loop() {
        let svc = ScriptedService::new(vec![
            Step::Status(503, &[("retry-after", "10")]),
            Step::Status(503, &[("retry-after", "10")]),
            Step::Status(503, &[("retry-after", "10")]),
        ]);
        let mut retry =
            RetryLayer::with_total_timeout(fast_config(), Some(Duration::from_secs(5)))
                .layer(svc.clone());
        let err = retry.call(request(Method::GET)).await.unwrap_err();
        assert!(matches!(err, HttpError::DeadlineExceeded(d) if d == Duration::from_secs(5)));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let backoff = ExponentialBackoff {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(500),
            multiplier: 2.0,
            jitter: false,
        };
        assert_eq!(calculate_backoff(&backoff, 0), Duration::from_millis(100));
        assert_eq!(calculate_backoff(&backoff, 1), Duration::from_millis(200));
        assert_eq!(calculate_backoff(&backoff, 2), Duration::from_millis(400));
        assert_eq!(calculate_backoff(&backoff, 3), Duration::from_millis(500));
        assert_eq!(calculate_backoff(&backoff, 1000), Duration::from_millis(500));
    }

    #[test]
    fn test_backoff_jitter_stays_in_bounds() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(1));
        for _ in 0..50 {
            let d = calculate_backoff(&backoff, 0);
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_millis(125));
        }
    }

    #[test]
    fn test_backoff_sanitizes_bad_multiplier() {
        let backoff = ExponentialBackoff {
            initial: Duration::from_millis(10),
            max: Duration::from_secs(1),
            multiplier: f64::NAN,
            jitter: false,
        };
        assert_eq!(calculate_backoff(&backoff, 5), Duration::from_millis(10));
    }
}
