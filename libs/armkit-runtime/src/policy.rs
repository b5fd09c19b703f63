use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use armkit_http::{HttpError, ResponseBody};
use armkit_identity::{AccessToken, TokenCredential, TokenRequestOptions};
use bytes::Bytes;
use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use http::{HeaderValue, Request, Response, StatusCode};
use http_body_util::Full;
use tower::{Layer, Service, ServiceExt};

/// Tokens expiring within this window are refreshed before use.
pub const REFRESH_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Tower layer that authorizes ARM requests with a bearer token.
///
/// The token is cached across requests and re-acquired when it is about to
/// expire. A `401` carrying a `Bearer` challenge invalidates the credential
/// and the request is replayed once with a fresh token.
#[derive(Clone)]
pub struct BearerTokenLayer {
    state: Arc<TokenState>,
}

struct TokenState {
    credential: Arc<dyn TokenCredential>,
    options: TokenRequestOptions,
    cached: ArcSwapOption<AccessToken>,
    allow_insecure: bool,
}

impl BearerTokenLayer {
    pub fn new(credential: Arc<dyn TokenCredential>, scopes: Vec<String>) -> Self {
        Self {
            state: Arc::new(TokenState {
                credential,
                options: TokenRequestOptions { scopes },
                cached: ArcSwapOption::empty(),
                allow_insecure: false,
            }),
        }
    }

    /// Permit sending the token to `http://` endpoints. Mock servers only.
    #[must_use]
    pub fn allow_insecure(self, allow: bool) -> Self {
        let state = &self.state;
        Self {
            state: Arc::new(TokenState {
                credential: Arc::clone(&state.credential),
                options: state.options.clone(),
                cached: ArcSwapOption::empty(),
                allow_insecure: allow,
            }),
        }
    }
}

impl fmt::Debug for BearerTokenLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenLayer")
            .field("scopes", &self.state.options.scopes)
            .field("allow_insecure", &self.state.allow_insecure)
            .finish_non_exhaustive()
    }
}

impl TokenState {
    async fn token(&self) -> Result<Arc<AccessToken>, HttpError> {
        if let Some(token) = self.cached.load_full()
            && !token.expires_within(REFRESH_WINDOW)
        {
            return Ok(token);
        }

        let token = Arc::new(
            self.credential
                .get_token(&self.options)
                .await
                .map_err(|e| HttpError::Auth(Box::new(e)))?,
        );
        tracing::info!(
            scopes = %self.options.scope_string(),
            "acquired access token"
        );
        self.cached.store(Some(Arc::clone(&token)));
        Ok(token)
    }

    fn invalidate(&self) {
        self.cached.store(None);
        self.credential.invalidate();
    }

    fn check_scheme(&self, uri: &http::Uri) -> Result<(), HttpError> {
        if self.allow_insecure || uri.scheme_str() == Some("https") {
            return Ok(());
        }
        Err(HttpError::Auth(
            format!("refusing to send a bearer token to non-TLS endpoint {uri}").into(),
        ))
    }
}

fn authorize(request: &mut Request<Full<Bytes>>, token: &AccessToken) -> Result<(), HttpError> {
    let mut value = HeaderValue::try_from(format!("Bearer {}", token.token.expose()))?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

fn is_bearer_challenge<B>(response: &Response<B>) -> bool {
    response.status() == StatusCode::UNAUTHORIZED
        && response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| {
                v.get(..6)
                    .is_some_and(|scheme| scheme.eq_ignore_ascii_case("bearer"))
            })
}

impl<S> Layer<S> for BearerTokenLayer {
    type Service = BearerTokenService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerTokenService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

#[derive(Clone)]
pub struct BearerTokenService<S> {
    inner: S,
    state: Arc<TokenState>,
}

impl<S> Service<Request<Full<Bytes>>> for BearerTokenService<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<ResponseBody>, Error = HttpError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = Response<ResponseBody>;
    type Error = HttpError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, HttpError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Full<Bytes>>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let state = Arc::clone(&self.state);

        Box::pin(async move {
            state.check_scheme(request.uri())?;
            let token = state.token().await?;

            let (parts, body) = request.into_parts();
            let mut replay = Request::from_parts(parts.clone(), body.clone());
            let mut first = Request::from_parts(parts, body);
            authorize(&mut first, &token)?;

            let response = inner.call(first).await?;
            if !is_bearer_challenge(&response) {
                return Ok(response);
            }

            tracing::debug!("bearer challenge received, re-acquiring token");
            drop(response);
            state.invalidate();
            let token = state.token().await?;
            authorize(&mut replay, &token)?;
            inner.ready().await?.call(replay).await
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use armkit_identity::CredentialError;
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::SystemTime;

    /// Hands out `tok-1`, `tok-2`, ... and counts invalidations.
    struct CountingCredential {
        issued: AtomicUsize,
        invalidated: AtomicUsize,
        lifetime: Duration,
    }

    impl CountingCredential {
        fn new(lifetime: Duration) -> Arc<Self> {
            Arc::new(Self {
                issued: AtomicUsize::new(0),
                invalidated: AtomicUsize::new(0),
                lifetime,
            })
        }
    }

    #[async_trait::async_trait]
    impl TokenCredential for CountingCredential {
        async fn get_token(
            &self,
            _options: &TokenRequestOptions,
        ) -> Result<AccessToken, CredentialError> {
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken::new(
                format!("tok-{n}"),
                SystemTime::now() + self.lifetime,
            ))
        }

        fn invalidate(&self) {
            self.invalidated.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FailingCredential;

    #[async_trait::async_trait]
    impl TokenCredential for FailingCredential {
        async fn get_token(
            &self,
            _options: &TokenRequestOptions,
        ) -> Result<AccessToken, CredentialError> {
            Err(CredentialError::Unavailable("no login".into()))
        }
    }

    /// Records the `Authorization` header of each call; answers with the
    /// scripted statuses, then 200.
    #[derive(Clone)]
    struct Recorder {
        seen: Arc<Mutex<Vec<String>>>,
        script: Arc<Mutex<Vec<(u16, Option<&'static str>)>>>,
    }

    impl Recorder {
        fn new(script: Vec<(u16, Option<&'static str>)>) -> Self {
            Self {
                seen: Arc::new(Mutex::new(Vec::new())),
                script: Arc::new(Mutex::new(script)),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Service<Request<Full<Bytes>>> for Recorder {
        type Response = Response<ResponseBody>;
        type Error = HttpError;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, HttpError>> + Send>>;

        fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), HttpError>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
            let auth = req.headers().get(AUTHORIZATION).unwrap();
            assert!(auth.is_sensitive());
            self.seen
                .lock()
                .unwrap()
                .push(auth.to_str().unwrap().to_owned());
            let (status, challenge) = {
                let mut script = self.script.lock().unwrap();
                if script.is_empty() {
                    (200, None)
                } else {
                    script.remove(0)
                }
            };
            Box::pin(async move {
                let mut builder = Response::builder().status(status);
                if let Some(challenge) = challenge {
                    builder = builder.header(WWW_AUTHENTICATE, challenge);
                }
                let body: ResponseBody = Full::new(Bytes::new())
                    .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })
                    .boxed();
                Ok(builder.body(body).unwrap())
            })
        }
    }

    fn request(uri: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .uri(uri)
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap()
    }

    fn scopes() -> Vec<String> {
        vec!["https://management.core.windows.net/.default".into()]
    }

    #[tokio::test]
    async fn test_token_is_cached_across_requests() {
        let cred = CountingCredential::new(Duration::from_secs(3600));
        let recorder = Recorder::new(vec![]);
        let mut svc = BearerTokenLayer::new(cred.clone(), scopes()).layer(recorder.clone());

        for _ in 0..3 {
            let resp = svc
                .ready()
                .await
                .unwrap()
                .call(request("https://management.azure.com/x"))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
        assert_eq!(cred.issued.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.seen(), vec!["Bearer tok-1"; 3]);
    }

    #[tokio::test]
    async fn test_token_near_expiry_is_refreshed() {
        let cred = CountingCredential::new(Duration::from_secs(60));
        let recorder = Recorder::new(vec![]);
        let mut svc = BearerTokenLayer::new(cred.clone(), scopes()).layer(recorder.clone());

        for _ in 0..2 {
            svc.ready()
                .await
                .unwrap()
                .call(request("https://management.azure.com/x"))
                .await
                .unwrap();
        }
        assert_eq!(recorder.seen(), vec!["Bearer tok-1", "Bearer tok-2"]);
    }

    #[tokio::test]
    async fn test_bearer_challenge_retries_once_with_fresh_token() {
        let cred = CountingCredential::new(Duration::from_secs(3600));
        let recorder = Recorder::new(vec![(401, Some("Bearer authorization_uri=\"x\""))]);
        let mut svc = BearerTokenLayer::new(cred.clone(), scopes()).layer(recorder.clone());

        let resp = svc
            .ready()
            .await
            .unwrap()
            .call(request("https://management.azure.com/x"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(recorder.seen(), vec!["Bearer tok-1", "Bearer tok-2"]);
        assert_eq!(cred.invalidated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_challenge_is_returned() {
        let cred = CountingCredential::new(Duration::from_secs(3600));
        let recorder = Recorder::new(vec![(401, Some("Bearer")), (401, Some("Bearer"))]);
        let mut svc = BearerTokenLayer::new(cred.clone(), scopes()).layer(recorder.clone());

        let resp = svc
            .ready()
            .await
            .unwrap()
            .call(request("https://management.azure.com/x"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(recorder.seen().len(), 2);
    }

    #[tokio::test]
    async fn test_401_without_bearer_challenge_passes_through() {
        let cred = CountingCredential::new(Duration::from_secs(3600));
        let recorder = Recorder::new(vec![(401, None)]);
        let mut svc = BearerTokenLayer::new(cred.clone(), scopes()).layer(recorder.clone());

        let resp = svc
            .ready()
            .await
            .unwrap()
            .call(request("https://management.azure.com/x"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(cred.invalidated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_plain_http_is_refused_unless_allowed() {
        let cred = CountingCredential::new(Duration::from_secs(3600));
        let recorder = Recorder::new(vec![]);
        let mut svc = BearerTokenLayer::new(cred.clone(), scopes()).layer(recorder.clone());
        let err = svc
            .ready()
            .await
            .unwrap()
            .call(request("http://127.0.0.1:1/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Auth(_)));
        assert_eq!(cred.issued.load(Ordering::SeqCst), 0);

        let mut svc = BearerTokenLayer::new(cred, scopes())
            .allow_insecure(true)
            .layer(recorder.clone());
        svc.ready()
            .await
            .unwrap()
            .call(request("http://127.0.0.1:1/x"))
            .await
            .unwrap();
        assert_eq!(recorder.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_credential_failure_maps_to_auth_error() {
        let mut svc = BearerTokenLayer::new(Arc::new(FailingCredential), scopes())
            .layer(Recorder::new(vec![]));
        let err = svc
            .ready()
            .await
            .unwrap()
            .call(request("https://management.azure.com/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Auth(_)));
    }

    #[test]
    fn test_debug_hides_credential() {
        let layer = BearerTokenLayer::new(Arc::new(FailingCredential), scopes());
        let dbg = format!("{layer:?}");
        assert!(dbg.contains("BearerTokenLayer"));
        assert!(dbg.contains("management.core.windows.net"));
    }
}
