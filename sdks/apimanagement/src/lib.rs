#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Azure API Management Resource Manager client
//!
//! One client per resource type, each bound to a subscription:
//! - [`ApiDiagnosticClient`], [`ApiOperationClient`]: diagnostics and operations of an API
//! - [`PolicyRestrictionClient`], [`ProductPolicyClient`]: policy documents and restrictions
//! - [`WorkspaceApiSchemaClient`], [`WorkspaceLoggerClient`]: workspace-scoped resources
//! - [`BackendClient`]: backends, including `reconnect`
//! - [`ApiGatewayClient`]: standalone gateways, managed through long-running operations
//! - [`ReportsClient`]: usage reports
//!
//! Reads return the model in a [`Versioned`] that carries its `ETag`; pass
//! that tag back as `if_match` to update or delete only the version you read.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use armapimanagement::{ClientFactory, ClientOptions, ListOptions};
//! use armkit_identity::EnvironmentCredential;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = Arc::new(EnvironmentCredential::from_env()?);
//! let factory = ClientFactory::new("sub-id", credential, &ClientOptions::load(None)?)?;
//! let backends = factory.backend_client();
//!
//! let all = backends
//!     .list_by_service("rg1", "apimService1", &ListOptions::default().with_top(50))
//!     .collect_all()
//!     .await?;
//! for backend in all {
//!     println!("{}", backend.name.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

mod clients;
pub mod models;
mod options;
mod response;

pub use clients::{
    API_VERSION, ApiDiagnosticClient, ApiGatewayClient, ApiOperationClient, BACKEND_API_VERSION,
    BackendClient, ClientFactory, PolicyRestrictionClient, ProductPolicyClient, ReportsClient,
    WorkspaceApiSchemaClient, WorkspaceLoggerClient,
};
pub use options::{
    ListOptions, OperationListOptions, ProductPolicyGetOptions, ReportListOptions,
    SchemaDeleteOptions,
};
pub use response::{EntityTag, Versioned};

pub use armkit_runtime::{
    ArmError, ClientOptions, ETag, OperationStatus, Page, Pager, PollUntilDoneOptions, Poller,
};
