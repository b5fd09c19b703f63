use std::sync::Arc;

use armkit_http::RequestBuilder;
use armkit_identity::TokenCredential;
use armkit_runtime::{ArmError, ClientOptions, Pager, Poller, PollerOptions};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::{API_VERSION, ClientCore};
use crate::models::{GatewayListResult, GatewayResource, GatewayUpdateParameters};
use crate::response::Versioned;

const GATEWAY_PATH: &str = "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.ApiManagement/gateways/{gatewayName}";
const GROUP_GATEWAYS_PATH: &str = "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.ApiManagement/gateways";
const GATEWAYS_PATH: &str = "/subscriptions/{subscriptionId}/providers/Microsoft.ApiManagement/gateways";

const CREATE_OR_UPDATE_KIND: &str = "ApiGatewayClient::begin_create_or_update";
const UPDATE_KIND: &str = "ApiGatewayClient::begin_update";
const DELETE_KIND: &str = "ApiGatewayClient::begin_delete";

/// Standalone API Management gateways. Unlike the other clients these are
/// top-level resources and not scoped to a service.
#[derive(Clone, Debug)]
pub struct ApiGatewayClient {
    core: ClientCore,
}

impl ApiGatewayClient {
    /// # Errors
    /// When the pipeline cannot be built from `options`.
    pub fn new(
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
        options: &ClientOptions,
    ) -> Result<Self, ArmError> {
        Ok(Self {
            core: ClientCore::connect(subscription_id.into(), credential, options, API_VERSION)?,
        })
    }

    pub(super) fn from_core(core: ClientCore) -> Self {
        Self { core }
    }

    fn gateway_url(&self, resource_group_name: &str, gateway_name: &str) -> Result<Url, ArmError> {
        self.core
            .url(GATEWAY_PATH)
            .path_param("resourceGroupName", resource_group_name)
            .path_param("gatewayName", gateway_name)
            .build()
    }

    async fn begin<T: DeserializeOwned>(
        &self,
        kind: &str,
        method: Method,
        url: &Url,
        request: RequestBuilder,
        expected: &[StatusCode],
    ) -> Result<Poller<T>, ArmError> {
        let response = request.send().await?;
        let response =
            armkit_runtime::ensure_status(&method, url.as_str(), response, expected).await?;
        Poller::from_response(
            self.core.pipeline.clone(),
            kind,
            method,
            url,
            response,
            PollerOptions::default(),
        )
        .await
    }

    /// Start creating or replacing a gateway.
    ///
    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/201.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn begin_create_or_update(
        &self,
        resource_group_name: &str,
        gateway_name: &str,
        parameters: &GatewayResource,
    ) -> Result<Poller<GatewayResource>, ArmError> {
        let url = self.gateway_url(resource_group_name, gateway_name)?;
        let request = self.core.request(Method::PUT, &url).json(parameters)?;
        self.begin(
            CREATE_OR_UPDATE_KIND,
            Method::PUT,
            &url,
            request,
            &[StatusCode::OK, StatusCode::CREATED],
        )
        .await
    }

    /// # Errors
    /// [`ArmError::ResumeToken`] for a token of another operation.
    pub fn resume_create_or_update(&self, token: &str) -> Result<Poller<GatewayResource>, ArmError> {
        Poller::from_resume_token(self.core.pipeline.clone(), CREATE_OR_UPDATE_KIND, token)
    }

    /// Start patching a gateway.
    ///
    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/202.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn begin_update(
        &self,
        resource_group_name: &str,
        gateway_name: &str,
        parameters: &GatewayUpdateParameters,
    ) -> Result<Poller<GatewayResource>, ArmError> {
        let url = self.gateway_url(resource_group_name, gateway_name)?;
        let request = self.core.request(Method::PATCH, &url).json(parameters)?;
        self.begin(
            UPDATE_KIND,
            Method::PATCH,
            &url,
            request,
            &[StatusCode::OK, StatusCode::ACCEPTED],
        )
        .await
    }

    /// # Errors
    /// [`ArmError::ResumeToken`] for a token of another operation.
    pub fn resume_update(&self, token: &str) -> Result<Poller<GatewayResource>, ArmError> {
        Poller::from_resume_token(self.core.pipeline.clone(), UPDATE_KIND, token)
    }

    /// Start deleting a gateway.
    ///
    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/202/204.
    #[tracing::instrument(skip(self))]
    pub async fn begin_delete(
        &self,
        resource_group_name: &str,
        gateway_name: &str,
    ) -> Result<Poller<()>, ArmError> {
        let url = self.gateway_url(resource_group_name, gateway_name)?;
        let request = self.core.request(Method::DELETE, &url);
        self.begin(
            DELETE_KIND,
            Method::DELETE,
            &url,
            request,
            &[StatusCode::OK, StatusCode::ACCEPTED, StatusCode::NO_CONTENT],
        )
        .await
    }

    /// # Errors
    /// [`ArmError::ResumeToken`] for a token of another operation.
    pub fn resume_delete(&self, token: &str) -> Result<Poller<()>, ArmError> {
        Poller::from_resume_token(self.core.pipeline.clone(), DELETE_KIND, token)
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200.
    #[tracing::instrument(skip(self))]
    pub async fn get(
        &self,
        resource_group_name: &str,
        gateway_name: &str,
    ) -> Result<GatewayResource, ArmError> {
        let url = self.gateway_url(resource_group_name, gateway_name)?;
        let request = self.core.request(Method::GET, &url);
        ClientCore::read_entity(&Method::GET, &url, request, &[StatusCode::OK])
            .await
            .map(Versioned::into_inner)
    }

    /// Every gateway in the subscription.
    pub fn list(&self) -> Pager<GatewayListResult> {
        let first = self.core.url(GATEWAYS_PATH).build();
        Pager::get_pages(self.core.pipeline.clone(), first)
    }

    pub fn list_by_resource_group(&self, resource_group_name: &str) -> Pager<GatewayListResult> {
        let first = self
            .core
            .url(GROUP_GATEWAYS_PATH)
            .path_param("resourceGroupName", resource_group_name)
            .build();
        Pager::get_pages(self.core.pipeline.clone(), first)
    }
}
