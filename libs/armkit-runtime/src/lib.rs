#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Azure Resource Manager runtime
//!
//! Everything an operation client needs between its typed API and the wire:
//! - [`ClientOptions`]: cloud selection and transport settings, loadable from
//!   YAML and `APIM_*` environment variables
//! - [`ArmPipeline`]: an [`armkit_http::HttpClient`] whose every attempt is
//!   authorized by [`BearerTokenLayer`]
//! - [`UrlTemplate`]: path parameter substitution with empty-value checks
//! - [`Pager`]: `nextLink` pagination as a `Stream`
//! - [`Poller`]: long-running operations, resumable across processes
//! - [`ArmError`] / [`ResponseError`]: service failures with their error code

mod cloud;
mod error;
mod etag;
mod options;
mod pager;
mod pipeline;
mod policy;
mod poller;
mod response_error;
mod url_template;

pub use cloud::{CloudConfig, CloudName};
pub use error::{ArmError, ErrorDetail};
pub use etag::{ETag, IF_MATCH};
pub use options::{ClientOptions, DEFAULT_POLL_FREQUENCY, ENV_PREFIX, HttpOptions, duration_serde};
pub use pager::{Page, Pager};
pub use pipeline::ArmPipeline;
pub use policy::{BearerTokenLayer, BearerTokenService, REFRESH_WINDOW};
pub use poller::{FinalStateVia, OperationStatus, PollUntilDoneOptions, Poller, PollerOptions};
pub use response_error::{ResponseError, ensure_status};
pub use url_template::UrlTemplate;

/// Default `User-Agent` of ARM clients.
pub const USER_AGENT: &str = concat!("armkit/", env!("CARGO_PKG_VERSION"));
