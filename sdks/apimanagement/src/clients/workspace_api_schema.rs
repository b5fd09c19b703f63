use std::sync::Arc;

use armkit_identity::TokenCredential;
use armkit_runtime::{
    ArmError, ClientOptions, ETag, FinalStateVia, IF_MATCH, Pager, Poller, PollerOptions,
    UrlTemplate,
};
use http::{Method, StatusCode};

use super::{API_VERSION, ClientCore, with_if_match};
use crate::models::{SchemaCollection, SchemaContract};
use crate::options::{ListOptions, SchemaDeleteOptions};
use crate::response::{EntityTag, Versioned};

const SCHEMA_PATH: &str =
    service_path!("/workspaces/{workspaceId}/apis/{apiId}/schemas/{schemaId}");
const SCHEMAS_PATH: &str = service_path!("/workspaces/{workspaceId}/apis/{apiId}/schemas");

/// Kind recorded in resume tokens of `begin_create_or_update`.
const CREATE_OR_UPDATE_KIND: &str = "WorkspaceApiSchemaClient::begin_create_or_update";

/// Schemas of APIs that live in a workspace.
#[derive(Clone, Debug)]
pub struct WorkspaceApiSchemaClient {
    core: ClientCore,
}

impl WorkspaceApiSchemaClient {
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

    fn api_url(
        &self,
        path: &str,
        resource_group_name: &str,
        service_name: &str,
        workspace_id: &str,
        api_id: &str,
    ) -> UrlTemplate {
        self.core
            .service_url(path, resource_group_name, service_name)
            .path_param("workspaceId", workspace_id)
            .path_param("apiId", api_id)
    }

    /// Start creating or replacing a schema.
    ///
    /// Large documents are processed asynchronously; the returned poller
    /// follows the `Location` monitor and reads the schema from it.
    ///
    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/201/202.
    #[allow(clippy::too_many_arguments)] // one parameter per path segment
    #[tracing::instrument(skip(self, parameters))]
    pub async fn begin_create_or_update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        workspace_id: &str,
        api_id: &str,
        schema_id: &str,
        parameters: &SchemaContract,
        if_match: Option<&ETag>,
    ) -> Result<Poller<SchemaContract>, ArmError> {
        let url = self
            .api_url(SCHEMA_PATH, resource_group_name, service_name, workspace_id, api_id)
            .path_param("schemaId", schema_id)
            .build()?;
        let request = self.core.request(Method::PUT, &url).json(parameters)?;
        let response = with_if_match(request, if_match).send().await?;
        let response = armkit_runtime::ensure_status(
            &Method::PUT,
            url.as_str(),
            response,
            &[StatusCode::OK, StatusCode::CREATED, StatusCode::ACCEPTED],
        )
        .await?;
        Poller::from_response(
            self.core.pipeline.clone(),
            CREATE_OR_UPDATE_KIND,
            Method::PUT,
            &url,
            response,
            PollerOptions {
                final_state_via: Some(FinalStateVia::Location),
            },
        )
        .await
    }

    /// Continue an operation saved with [`Poller::resume_token`].
    ///
    /// # Errors
    /// [`ArmError::ResumeToken`] when the token does not belong to
    /// [`begin_create_or_update`](Self::begin_create_or_update).
    pub fn resume_create_or_update(&self, token: &str) -> Result<Poller<SchemaContract>, ArmError> {
        Poller::from_resume_token(self.core.pipeline.clone(), CREATE_OR_UPDATE_KIND, token)
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/204.
    #[allow(clippy::too_many_arguments)] // one parameter per path segment
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        resource_group_name: &str,
        service_name: &str,
        workspace_id: &str,
        api_id: &str,
        schema_id: &str,
        if_match: &ETag,
        options: SchemaDeleteOptions,
    ) -> Result<(), ArmError> {
        let url = self
            .api_url(SCHEMA_PATH, resource_group_name, service_name, workspace_id, api_id)
            .path_param("schemaId", schema_id)
            .query_opt("force", options.force)
            .build()?;
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
        api_id: &str,
        schema_id: &str,
    ) -> Result<Versioned<SchemaContract>, ArmError> {
        let url = self
            .api_url(SCHEMA_PATH, resource_group_name, service_name, workspace_id, api_id)
            .path_param("schemaId", schema_id)
            .build()?;
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
        api_id: &str,
        schema_id: &str,
    ) -> Result<EntityTag, ArmError> {
        let url = self
            .api_url(SCHEMA_PATH, resource_group_name, service_name, workspace_id, api_id)
            .path_param("schemaId", schema_id)
            .build()?;
        self.core.read_entity_tag(&url).await
    }

    /// Schemas of one API. `$filter` supports `contentType` with `eq`, `ne`,
    /// `substringof`, `contains`, `startswith` and `endswith`.
    pub fn list_by_api(
        &self,
        resource_group_name: &str,
        service_name: &str,
        workspace_id: &str,
        api_id: &str,
        options: &ListOptions,
    ) -> Pager<SchemaCollection> {
        let first = options
            .apply(self.api_url(
                SCHEMAS_PATH,
                resource_group_name,
                service_name,
                workspace_id,
                api_id,
            ))
            .build();
        Pager::get_pages(self.core.pipeline.clone(), first)
    }
}
