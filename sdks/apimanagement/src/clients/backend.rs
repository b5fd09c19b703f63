use std::sync::Arc;

use armkit_identity::TokenCredential;
use armkit_runtime::{ArmError, ClientOptions, ETag, IF_MATCH, Pager};
use http::{Method, StatusCode};
use url::Url;

use super::{ClientCore, with_if_match};
use crate::models::{
    BackendCollection, BackendContract, BackendReconnectContract, BackendUpdateParameters,
};
use crate::options::ListOptions;
use crate::response::{EntityTag, Versioned};

/// API version targeted by [`BackendClient`].
pub const BACKEND_API_VERSION: &str = "2021-08-01";

const BACKEND_PATH: &str = service_path!("/backends/{backendId}");
const BACKENDS_PATH: &str = service_path!("/backends");
const RECONNECT_PATH: &str = service_path!("/backends/{backendId}/reconnect");

/// Backends that APIs forward requests to.
#[derive(Clone, Debug)]
pub struct BackendClient {
    core: ClientCore,
}

impl BackendClient {
    /// # Errors
    /// When the pipeline cannot be built from `options`.
    pub fn new(
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
        options: &ClientOptions,
    ) -> Result<Self, ArmError> {
        Ok(Self {
            core: ClientCore::connect(
                subscription_id.into(),
                credential,
                options,
                BACKEND_API_VERSION,
            )?,
        })
    }

    pub(super) fn from_core(core: ClientCore) -> Self {
        Self { core }
    }

    fn backend_url(
        &self,
        path: &str,
        resource_group_name: &str,
        service_name: &str,
        backend_id: &str,
    ) -> Result<Url, ArmError> {
        self.core
            .service_url(path, resource_group_name, service_name)
            .path_param("backendId", backend_id)
            .build()
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/201.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        backend_id: &str,
        parameters: &BackendContract,
        if_match: Option<&ETag>,
    ) -> Result<Versioned<BackendContract>, ArmError> {
        let url = self.backend_url(BACKEND_PATH, resource_group_name, service_name, backend_id)?;
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
        backend_id: &str,
        if_match: &ETag,
    ) -> Result<(), ArmError> {
        let url = self.backend_url(BACKEND_PATH, resource_group_name, service_name, backend_id)?;
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
        backend_id: &str,
    ) -> Result<Versioned<BackendContract>, ArmError> {
        let url = self.backend_url(BACKEND_PATH, resource_group_name, service_name, backend_id)?;
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
        backend_id: &str,
    ) -> Result<EntityTag, ArmError> {
        let url = self.backend_url(BACKEND_PATH, resource_group_name, service_name, backend_id)?;
        self.core.read_entity_tag(&url).await
    }

    /// Backends of a service. `$filter` supports `name`, `title` and `url`.
    pub fn list_by_service(
        &self,
        resource_group_name: &str,
        service_name: &str,
        options: &ListOptions,
    ) -> Pager<BackendCollection> {
        let first = options
            .apply(
                self.core
                    .service_url(BACKENDS_PATH, resource_group_name, service_name),
            )
            .build();
        Pager::get_pages(self.core.pipeline.clone(), first)
    }

    /// Ask the gateway to open fresh connections to the backend, after the
    /// delay in `parameters` or immediately.
    ///
    /// # Errors
    /// Empty identifiers, transport failures, or any status but 202.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn reconnect(
        &self,
        resource_group_name: &str,
        service_name: &str,
        backend_id: &str,
        parameters: Option<&BackendReconnectContract>,
    ) -> Result<(), ArmError> {
        let url = self.backend_url(RECONNECT_PATH, resource_group_name, service_name, backend_id)?;
        let mut request = self.core.request(Method::POST, &url);
        if let Some(parameters) = parameters {
            request = request.json(parameters)?;
        }
        ClientCore::expect_status(&Method::POST, &url, request, &[StatusCode::ACCEPTED]).await
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        backend_id: &str,
        if_match: &ETag,
        parameters: &BackendUpdateParameters,
    ) -> Result<Versioned<BackendContract>, ArmError> {
        let url = self.backend_url(BACKEND_PATH, resource_group_name, service_name, backend_id)?;
        let request = self
            .core
            .request(Method::PATCH, &url)
            .header(IF_MATCH, if_match.as_str())
            .json(parameters)?;
        ClientCore::read_entity(&Method::PATCH, &url, request, &[StatusCode::OK]).await
    }
}
