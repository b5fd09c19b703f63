//! Operation clients, one per resource type.

/// Prefix `$suffix` with the path of an API Management service instance.
macro_rules! service_path {
    ($suffix:literal) => {
        concat!(
            "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}",
            "/providers/Microsoft.ApiManagement/service/{serviceName}",
            $suffix
        )
    };
}

mod api_diagnostic;
mod api_gateway;
mod api_operation;
mod backend;
mod client_factory;
mod policy_restriction;
mod product_policy;
mod reports;
mod workspace_api_schema;
mod workspace_logger;

pub use api_diagnostic::ApiDiagnosticClient;
pub use api_gateway::ApiGatewayClient;
pub use api_operation::ApiOperationClient;
pub use backend::{BACKEND_API_VERSION, BackendClient};
pub use client_factory::ClientFactory;
pub use policy_restriction::PolicyRestrictionClient;
pub use product_policy::ProductPolicyClient;
pub use reports::ReportsClient;
pub use workspace_api_schema::WorkspaceApiSchemaClient;
pub use workspace_logger::WorkspaceLoggerClient;

use std::sync::Arc;

use armkit_http::RequestBuilder;
use armkit_identity::TokenCredential;
use armkit_runtime::{
    ArmError, ArmPipeline, ClientOptions, ETag, IF_MATCH, UrlTemplate, ensure_status,
};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::response::{EntityTag, Versioned};

/// API version of every client except [`BackendClient`].
pub const API_VERSION: &str = "2024-05-01";

/// State shared by every operation client: the subscription the client is
/// bound to, the pipeline and the API version it targets.
#[derive(Clone, Debug)]
struct ClientCore {
    subscription_id: String,
    pipeline: ArmPipeline,
    api_version: &'static str,
}

impl ClientCore {
    fn new(subscription_id: String, pipeline: ArmPipeline, api_version: &'static str) -> Self {
        Self {
            subscription_id,
            pipeline,
            api_version,
        }
    }

    fn connect(
        subscription_id: String,
        credential: Arc<dyn TokenCredential>,
        options: &ClientOptions,
        api_version: &'static str,
    ) -> Result<Self, ArmError> {
        Ok(Self::new(
            subscription_id,
            ArmPipeline::new(credential, options)?,
            api_version,
        ))
    }

    /// `path` with the subscription bound and `api-version` set.
    fn url(&self, path: &str) -> UrlTemplate {
        self.pipeline
            .url(path)
            .path_param("subscriptionId", &self.subscription_id)
            .api_version(self.pipeline.api_version(self.api_version))
    }

    fn service_url(&self, path: &str, resource_group_name: &str, service_name: &str) -> UrlTemplate {
        self.url(path)
            .path_param("resourceGroupName", resource_group_name)
            .path_param("serviceName", service_name)
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        self.pipeline.request(method, url)
    }

    /// Send and decode a resource body together with its `ETag`.
    async fn read_entity<T: DeserializeOwned>(
        method: &Method,
        url: &Url,
        request: RequestBuilder,
        expected: &[StatusCode],
    ) -> Result<Versioned<T>, ArmError> {
        let response = request.send().await?;
        let response = ensure_status(method, url.as_str(), response, expected).await?;
        let etag = ETag::from_response(&response);
        let body = response.bytes().await?;
        Ok(Versioned {
            value: serde_json::from_slice(&body)?,
            etag,
        })
    }

    async fn read_entity_tag(&self, url: &Url) -> Result<EntityTag, ArmError> {
        let response = self.request(Method::HEAD, url).send().await?;
        let response = ensure_status(&Method::HEAD, url.as_str(), response, &[StatusCode::OK]).await?;
        Ok(EntityTag {
            success: response.status().is_success(),
            etag: ETag::from_response(&response),
        })
    }

    /// Send a request whose response body is not used.
    async fn expect_status(
        method: &Method,
        url: &Url,
        request: RequestBuilder,
        expected: &[StatusCode],
    ) -> Result<(), ArmError> {
        let response = request.send().await?;
        ensure_status(method, url.as_str(), response, expected).await?;
        Ok(())
    }
}

fn with_if_match(request: RequestBuilder, if_match: Option<&ETag>) -> RequestBuilder {
    match if_match {
        Some(etag) => request.header(IF_MATCH, etag.as_str()),
        None => request,
    }
}
