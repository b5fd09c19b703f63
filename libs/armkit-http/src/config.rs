use std::collections::HashSet;
use std::time::Duration;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("armkit-http/", env!("CARGO_PKG_VERSION"));

/// Conditions that can trigger a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RetryTrigger {
    /// Connection refused, reset, DNS failure and similar
    TransportError,
    /// A single attempt timed out
    Timeout,
    /// Response carried this status code
    Status(u16),
    /// Errors that are never retried (deadline, auth, closed service)
    NonRetryable,
}

impl RetryTrigger {
    pub const REQUEST_TIMEOUT: Self = Self::Status(408);
    pub const TOO_MANY_REQUESTS: Self = Self::Status(429);
    pub const INTERNAL_SERVER_ERROR: Self = Self::Status(500);
    pub const BAD_GATEWAY: Self = Self::Status(502);
    pub const SERVICE_UNAVAILABLE: Self = Self::Status(503);
    pub const GATEWAY_TIMEOUT: Self = Self::Status(504);
}

/// Exponential backoff: `min(initial * multiplier^attempt, max)`, plus up to
/// 25% jitter when enabled.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Delay before the first retry (default: 800ms)
    pub initial: Duration,
    /// Upper bound for any single delay (default: 60s)
    pub max: Duration,
    /// Growth factor per attempt (default: 2.0)
    pub multiplier: f64,
    /// Add 0-25% random delay (default: true)
    pub jitter: bool,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(800),
            max: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            ..Default::default()
        }
    }

    /// 1ms initial, 100ms max, no jitter. Meant for tests.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            initial: Duration::from_millis(1),
            max: Duration::from_millis(100),
            multiplier: 2.0,
            jitter: false,
        }
    }
}

/// Retry policy for ARM calls.
///
/// Resource Manager requests always carry a fully buffered body, and the
/// service tolerates replays of every verb it exposes, so the policy does not
/// distinguish idempotent from non-idempotent methods: a trigger in
/// `retry_on` is retried for any method.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt (default: 3)
    pub max_retries: usize,

    pub backoff: ExponentialBackoff,

    /// Default: transport errors, timeouts, 408, 429, 500, 502, 503, 504
    pub retry_on: HashSet<RetryTrigger>,

    /// Always use `backoff`, even when the server sent a retry hint
    pub ignore_retry_after: bool,

    /// Bytes of a retried response body to drain so the connection can be
    /// reused (default: 64 KiB, applied to decompressed bytes)
    pub retry_response_drain_limit: usize,
}

/// Default drain limit for response bodies before retry (64 KiB)
pub const DEFAULT_RETRY_RESPONSE_DRAIN_LIMIT: usize = 64 * 1024;

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: ExponentialBackoff::default(),
            retry_on: HashSet::from([
                RetryTrigger::TransportError,
                RetryTrigger::Timeout,
                RetryTrigger::REQUEST_TIMEOUT,
                RetryTrigger::TOO_MANY_REQUESTS,
                RetryTrigger::INTERNAL_SERVER_ERROR,
                RetryTrigger::BAD_GATEWAY,
                RetryTrigger::SERVICE_UNAVAILABLE,
                RetryTrigger::GATEWAY_TIMEOUT,
            ]),
            ignore_retry_after: false,
            retry_response_drain_limit: DEFAULT_RETRY_RESPONSE_DRAIN_LIMIT,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn should_retry(&self, trigger: RetryTrigger) -> bool {
        self.retry_on.contains(&trigger)
    }
}

/// Concurrency limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum in-flight requests (default: 100)
    pub max_concurrent_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 100,
        }
    }
}

/// TLS root certificate source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Mozilla roots bundled through webpki-roots
    #[default]
    WebPki,
    /// OS certificate store
    Native,
}

/// Whether plain `http://` URLs are accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// HTTPS only
    #[default]
    TlsOnly,
    /// Plain HTTP allowed. Mock servers only: bearer tokens travel in clear text.
    AllowInsecureHttp,
}

/// Overall HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-attempt timeout (default: 30s)
    pub request_timeout: Duration,

    /// Deadline across all attempts and backoff delays (default: none)
    pub total_timeout: Option<Duration>,

    /// Maximum decoded response body size (default: 10 MiB)
    pub max_body_size: usize,

    pub user_agent: String,

    pub retry: Option<RetryConfig>,

    pub rate_limit: Option<RateLimitConfig>,

    pub transport: TransportSecurity,

    pub tls_roots: TlsRootConfig,

    /// Stamp each call with a fresh `x-ms-client-request-id` (default: true)
    pub client_request_id: bool,

    /// Queue depth in front of the service stack (default: 1024, minimum 1)
    pub buffer_capacity: usize,

    /// Idle pooled connection lifetime (default: 90s; `None` uses hyper-util's default)
    pub pool_idle_timeout: Option<Duration>,

    /// Idle connections kept per host (default: 32)
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            total_timeout: None,
            max_body_size: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: Some(RetryConfig::default()),
            rate_limit: Some(RateLimitConfig::default()),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::default(),
            client_request_id: true,
            buffer_capacity: 1024,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpClientConfig {
    /// No retry, no concurrency limit, 10s attempts, 1 MiB bodies
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024,
            retry: None,
            rate_limit: None,
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(30)),
            pool_max_idle_per_host: 8,
            ..Self::default()
        }
    }

    /// Token endpoints: POST form requests, small bodies, a few quick retries
    #[must_use]
    pub fn token_endpoint() -> Self {
        Self {
            max_body_size: 1024 * 1024,
            retry: Some(RetryConfig {
                backoff: ExponentialBackoff::new(Duration::from_millis(200), Duration::from_secs(5)),
                ..RetryConfig::default()
            }),
            rate_limit: Some(RateLimitConfig {
                max_concurrent_requests: 10,
            }),
            client_request_id: true,
            buffer_capacity: 256,
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }

    /// Plain HTTP allowed, no retry. Mock servers only.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            transport: TransportSecurity::AllowInsecureHttp,
            pool_idle_timeout: Some(Duration::from_secs(10)),
            pool_max_idle_per_host: 4,
            ..Self::minimal()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_covers_arm_transient_statuses() {
        let config = RetryConfig::default();
        for status in [408, 429, 500, 502, 503, 504] {
            assert!(
                config.should_retry(RetryTrigger::Status(status)),
                "{status} should be retried"
            );
        }
        assert!(config.should_retry(RetryTrigger::TransportError));
        assert!(config.should_retry(RetryTrigger::Timeout));
    }

    #[test]
    fn test_default_retry_skips_client_errors() {
        let config = RetryConfig::default();
        for status in [400, 401, 403, 404, 409, 412, 501] {
            assert!(!config.should_retry(RetryTrigger::Status(status)));
        }
        assert!(!config.should_retry(RetryTrigger::NonRetryable));
    }

    #[test]
    fn test_disabled_retry_keeps_triggers_but_zero_attempts() {
        let config = RetryConfig::disabled();
        assert_eq!(config.max_retries, 0);
        assert!(config.should_retry(RetryTrigger::TOO_MANY_REQUESTS));
    }

    #[test]
    fn test_for_testing_allows_plain_http_without_retry() {
        let config = HttpClientConfig::for_testing();
        assert_eq!(config.transport, TransportSecurity::AllowInsecureHttp);
        assert!(config.retry.is_none());
        assert!(config.client_request_id);
    }

    #[test]
    fn test_default_backoff_values() {
        let backoff = ExponentialBackoff::default();
        assert_eq!(backoff.initial, Duration::from_millis(800));
        assert_eq!(backoff.max, Duration::from_secs(60));
        assert!(backoff.jitter);
    }
}
