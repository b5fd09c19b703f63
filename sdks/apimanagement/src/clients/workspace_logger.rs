use std::sync::Arc;

use armkit_identity::TokenCredential;
use armkit_runtime::{ArmError, ClientOptions, ETag, IF_MATCH, Pager};
use http::{Method, StatusCode};
use url::Url;

use super::{API_VERSION, ClientCore, with_if_match};
use crate::models::{LoggerCollection, LoggerContract, LoggerUpdateContract};
use crate::options::ListOptions;
use crate::response::{EntityTag, Versioned};

const LOGGER_PATH: &str = service_path!("/workspaces/{workspaceId}/loggers/{loggerId}");
const LOGGERS_PATH: &str = service_path!("/workspaces/{workspaceId}/loggers");

/// Loggers scoped to a workspace.
#[derive(Clone, Debug)]
pub struct WorkspaceLoggerClient {
    core: ClientCore,
}

impl WorkspaceLoggerClient {
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

    fn logger_url(
        &self,
        resource_group_name: &str,
        service_name: &str,
        workspace_id: &str,
        logger_id: &str,
    ) -> Result<Url, ArmError> {
        self.core
            .service_url(LOGGER_PATH, resource_group_name, service_name)
            .path_param("workspaceId", workspace_id)
            .path_param("loggerId", logger_id)
            .build()
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/201.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        workspace_id: &str,
        logger_id: &str,
        parameters: &LoggerContract,
        if_match: Option<&ETag>,
    ) -> Result<Versioned<LoggerContract>, ArmError> {
        let url = self.logger_url(resource_group_name, service_name, workspace_id, logger_id)?;
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
        workspace_id: &str,
        logger_id: &str,
        if_match: &ETag,
    ) -> Result<(), ArmError> {
        let url = self.logger_url(resource_group_name, service_name, workspace_id, logger_id)?;
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
        workspace_id: &str,
        logger_id: &str,
    ) -> Result<Versioned<LoggerContract>, ArmError> {
        let url = self.logger_url(resource_group_name, service_name, workspace_id, logger_id)?;
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
        workspace_id: &str,
        logger_id: &str,
    ) -> Result<EntityTag, ArmError> {
        let url = self.logger_url(resource_group_name, service_name, workspace_id, logger_id)?;
        self.core.read_entity_tag(&url).await
    }

    /// Loggers of a workspace. `$filter` supports `name`, `description`,
    /// `loggerType` and `resourceId`.
    pub fn list_by_workspace(
        &self,
        resource_group_name: &str,
        service_name: &str,
        workspace_id: &str,
        options: &ListOptions,
    ) -> Pager<LoggerCollection> {
        let first = options
            .apply(
                self.core
                    .service_url(LOGGERS_PATH, resource_group_name, service_name)
                    .path_param("workspaceId", workspace_id),
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
        workspace_id: &str,
        logger_id: &str,
        if_match: &ETag,
        parameters: &LoggerUpdateContract,
    ) -> Result<Versioned<LoggerContract>, ArmError> {
        let url = self.logger_url(resource_group_name, service_name, workspace_id, logger_id)?;
        let request = self
            .core
            .request(Method::PATCH, &url)
            .header(IF_MATCH, if_match.as_str())
            .json(parameters)?;
        ClientCore::read_entity(&Method::PATCH, &url, request, &[StatusCode::OK]).await
    }
}
