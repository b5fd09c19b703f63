//! Tower layers composed by [`HttpClientBuilder`](crate::HttpClientBuilder).
//!
//! - [`UserAgentLayer`] sets `User-Agent` when the caller did not
//! - [`ClientRequestIdLayer`] tags each logical call with `x-ms-client-request-id`
//! - [`RetryLayer`] replays throttled and transient failures

mod request_id;
mod retry;
mod user_agent;

pub use request_id::{CLIENT_REQUEST_ID_HEADER, ClientRequestIdLayer, ClientRequestIdService};
pub use retry::{RETRY_ATTEMPT_HEADER, RetryLayer, RetryService};
pub use user_agent::{UserAgentLayer, UserAgentService};
