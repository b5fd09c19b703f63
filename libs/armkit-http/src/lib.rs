#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP transport for Azure Resource Manager clients
//!
//! This crate provides the hyper-based client every ARM operation goes through:
//! - TLS via rustls (HTTPS only unless explicitly relaxed for mock servers)
//! - Connection pooling and per-attempt timeouts
//! - Retries of throttled and transient responses, honouring `retry-after-ms`,
//!   `x-ms-retry-after-ms` and `Retry-After`
//! - `User-Agent` and `x-ms-client-request-id` injection
//! - Concurrency limiting with fail-fast load shedding
//! - Transparent response decompression with limits applied to decoded bytes
//!
//! Authorization is not part of this crate. Callers plug it in with
//! [`HttpClientBuilder::with_auth_layer`], which places their layer inside the
//! retry loop so every attempt is signed with a current token.
//!
//! # Example
//!
//! ```ignore
//! let client = armkit_http::HttpClientBuilder::new()
//!     .user_agent("apim/0.1")
//!     .build()?;
//! let subscriptions: serde_json::Value = client
//!     .get("https://management.azure.com/subscriptions")
//!     .query("api-version", "2022-12-01")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
mod tls;

pub use builder::{HttpClientBuilder, InnerService};
pub use client::HttpClient;
pub use config::{
    DEFAULT_USER_AGENT, ExponentialBackoff, HttpClientConfig, RateLimitConfig, RetryConfig,
    RetryTrigger, TlsRootConfig, TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{
    CLIENT_REQUEST_ID_HEADER, ClientRequestIdLayer, ClientRequestIdService, RETRY_ATTEMPT_HEADER,
    RetryLayer, RetryService, UserAgentLayer, UserAgentService,
};
pub use request::RequestBuilder;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse, ResponseBody, parse_retry_after};
