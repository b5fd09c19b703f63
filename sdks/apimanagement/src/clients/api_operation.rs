use std::sync::Arc;

use armkit_identity::TokenCredential;
use armkit_runtime::{ArmError, ClientOptions, ETag, IF_MATCH, Pager};
use http::{Method, StatusCode};
use url::Url;

use super::{API_VERSION, ClientCore, with_if_match};
use crate::models::{OperationCollection, OperationContract, OperationUpdateContract};
use crate::options::OperationListOptions;
use crate::response::{EntityTag, Versioned};

const OPERATION_PATH: &str = service_path!("/apis/{apiId}/operations/{operationId}");
const OPERATIONS_PATH: &str = service_path!("/apis/{apiId}/operations");

/// Operations of an API.
#[derive(Clone, Debug)]
pub struct ApiOperationClient {
    core: ClientCore,
}

impl ApiOperationClient {
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

    fn operation_url(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        operation_id: &str,
    ) -> Result<Url, ArmError> {
        self.core
            .service_url(OPERATION_PATH, resource_group_name, service_name)
            .path_param("apiId", api_id)
            .path_param("operationId", operation_id)
            .build()
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/201.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        operation_id: &str,
        parameters: &OperationContract,
        if_match: Option<&ETag>,
    ) -> Result<Versioned<OperationContract>, ArmError> {
        let url = self.operation_url(resource_group_name, service_name, api_id, operation_id)?;
        let request = self.core.request(Method::PUT, &url).json(parameters)?;
        ClientCore::read_entity(
            &Method::PUT,
            &url,
            with_if_match(request, if_match),
            &[StatusCode::OK, StatusCode::CREATED],
        )
        .await
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/204.
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        operation_id: &str,
        if_match: &ETag,
    ) -> Result<(), ArmError> {
        let url = self.operation_url(resource_group_name, service_name, api_id, operation_id)?;
        let request = self
            .core
            .request(Method::DELETE, &url)
            .header(IF_MATCH, if_match.as_str());
        ClientCore::expect_status(
            &Method::DELETE,
            &url,
            request,
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200.
    #[tracing::instrument(skip(self))]
    pub async fn get(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        operation_id: &str,
    ) -> Result<Versioned<OperationContract>, ArmError> {
        let url = self.operation_url(resource_group_name, service_name, api_id, operation_id)?;
        let request = self.core.request(Method::GET, &url);
        ClientCore::read_entity(&Method::GET, &url, request, &[StatusCode::OK]).await
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200.
    #[tracing::instrument(skip(self))]
    pub async fn get_entity_tag(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        operation_id: &str,
    ) -> Result<EntityTag, ArmError> {
        let url = self.operation_url(resource_group_name, service_name, api_id, operation_id)?;
        self.core.read_entity_tag(&url).await
    }

    /// Operations of one API, optionally with their tags.
    pub fn list_by_api(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        options: &OperationListOptions,
    ) -> Pager<OperationCollection> {
        let first = options
            .apply(
                self.core
                    .service_url(OPERATIONS_PATH, resource_group_name, service_name)
                    .path_param("apiId", api_id),
            )
            .build();
        Pager::get_pages(self.core.pipeline.clone(), first)
    }

    /// Patch the fields set in `parameters`.
    ///
    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200.
    #[allow(clippy::too_many_arguments)] // one parameter per path segment
    #[tracing::instrument(skip(self, parameters))]
    pub async fn update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        operation_id: &str,
        if_match: &ETag,
        parameters: &OperationUpdateContract,
    ) -> Result<Versioned<OperationContract>, ArmError> {
        let url = self.operation_url(resource_group_name, service_name, api_id, operation_id)?;
        let request = self
            .core
            .request(Method::PATCH, &url)
            .header(IF_MATCH, if_match.as_str())
            .json(parameters)?;
        ClientCore::read_entity(&Method::PATCH, &url, request, &[StatusCode::OK]).await
    }
}
