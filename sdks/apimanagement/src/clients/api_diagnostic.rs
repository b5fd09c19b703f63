use std::sync::Arc;

use armkit_identity::TokenCredential;
use armkit_runtime::{ArmError, ClientOptions, ETag, IF_MATCH, Pager};
use http::{Method, StatusCode};
use url::Url;

use super::{API_VERSION, ClientCore, with_if_match};
use crate::models::{DiagnosticCollection, DiagnosticContract};
use crate::options::ListOptions;
use crate::response::{EntityTag, Versioned};

const DIAGNOSTIC_PATH: &str = service_path!("/apis/{apiId}/diagnostics/{diagnosticId}");
const DIAGNOSTICS_PATH: &str = service_path!("/apis/{apiId}/diagnostics");

/// Diagnostic settings of individual APIs.
#[derive(Clone, Debug)]
pub struct ApiDiagnosticClient {
    core: ClientCore,
}

impl ApiDiagnosticClient {
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

    fn diagnostic_url(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        diagnostic_id: &str,
    ) -> Result<Url, ArmError> {
        self.core
            .service_url(DIAGNOSTIC_PATH, resource_group_name, service_name)
            .path_param("apiId", api_id)
            .path_param("diagnosticId", diagnostic_id)
            .build()
    }

    /// Create a diagnostic, or replace it when `if_match` matches.
    ///
    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/201.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        diagnostic_id: &str,
        parameters: &DiagnosticContract,
        if_match: Option<&ETag>,
    ) -> Result<Versioned<DiagnosticContract>, ArmError> {
        let url = self.diagnostic_url(resource_group_name, service_name, api_id, diagnostic_id)?;
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
    /// Empty identifiers, transport failures, or any status but 200/204
    /// (`412` when `if_match` is stale).
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        diagnostic_id: &str,
        if_match: &ETag,
    ) -> Result<(), ArmError> {
        let url = self.diagnostic_url(resource_group_name, service_name, api_id, diagnostic_id)?;
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
        diagnostic_id: &str,
    ) -> Result<Versioned<DiagnosticContract>, ArmError> {
        let url = self.diagnostic_url(resource_group_name, service_name, api_id, diagnostic_id)?;
        let request = self.core.request(Method::GET, &url);
        ClientCore::read_entity(&Method::GET, &url, request, &[StatusCode::OK]).await
    }

    /// Current `ETag` of a diagnostic, without its body.
    ///
    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200.
    #[tracing::instrument(skip(self))]
    pub async fn get_entity_tag(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        diagnostic_id: &str,
    ) -> Result<EntityTag, ArmError> {
        let url = self.diagnostic_url(resource_group_name, service_name, api_id, diagnostic_id)?;
        self.core.read_entity_tag(&url).await
    }

    /// Diagnostics of one API. `$filter` supports `name` with `eq`, `ne`,
    /// `gt`, `lt`, `substringof`, `contains`, `startswith` and `endswith`.
    pub fn list_by_service(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        options: &ListOptions,
    ) -> Pager<DiagnosticCollection> {
        let first = options
            .apply(
                self.core
                    .service_url(DIAGNOSTICS_PATH, resource_group_name, service_name)
                    .path_param("apiId", api_id),
            )
            .build();
        Pager::get_pages(self.core.pipeline.clone(), first)
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200.
    #[allow(clippy::too_many_arguments)] // one parameter per path segment
    #[tracing::instrument(skip(self, parameters))]
    pub async fn update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        api_id: &str,
        diagnostic_id: &str,
        if_match: &ETag,
        parameters: &DiagnosticContract,
    ) -> Result<Versioned<DiagnosticContract>, ArmError> {
        let url = self.diagnostic_url(resource_group_name, service_name, api_id, diagnostic_id)?;
        let request = self
            .core
            .request(Method::PATCH, &url)
            .header(IF_MATCH, if_match.as_str())
            .json(parameters)?;
        ClientCore::read_entity(&Method::PATCH, &url, request, &[StatusCode::OK]).await
    }
}
