use std::sync::Arc;

use armkit_identity::TokenCredential;
use armkit_runtime::{ArmError, ClientOptions, ETag, IF_MATCH, Pager};
use http::{Method, StatusCode};
use url::Url;

use super::{API_VERSION, ClientCore, with_if_match};
use crate::models::{
    PolicyRestrictionCollection, PolicyRestrictionContract, PolicyRestrictionUpdateContract,
};
use crate::response::{EntityTag, Versioned};

const RESTRICTION_PATH: &str = service_path!("/policyRestrictions/{policyRestrictionId}");
const RESTRICTIONS_PATH: &str = service_path!("/policyRestrictions");

/// Policy restrictions of a service.
#[derive(Clone, Debug)]
pub struct PolicyRestrictionClient {
    core: ClientCore,
}

impl PolicyRestrictionClient {
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

    fn restriction_url(
        &self,
        resource_group_name: &str,
        service_name: &str,
        policy_restriction_id: &str,
    ) -> Result<Url, ArmError> {
        self.core
            .service_url(RESTRICTION_PATH, resource_group_name, service_name)
            .path_param("policyRestrictionId", policy_restriction_id)
            .build()
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/201.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        policy_restriction_id: &str,
        parameters: &PolicyRestrictionContract,
        if_match: Option<&ETag>,
    ) -> Result<Versioned<PolicyRestrictionContract>, ArmError> {
        let url = self.restriction_url(resource_group_name, service_name, policy_restriction_id)?;
        let request = self.core.request(Method::PUT, &url).json(parameters)?;
        ClientCore::read_entity(
            &Method::PUT,
            &url,
            with_if_match(request, if_match),
            &[StatusCode::OK, StatusCode::CREATED],
        )
        .await
    }

    /// Delete a restriction; without `if_match` the delete is unconditional.
    ///
    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/204.
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        resource_group_name: &str,
        service_name: &str,
        policy_restriction_id: &str,
        if_match: Option<&ETag>,
    ) -> Result<(), ArmError> {
        let url = self.restriction_url(resource_group_name, service_name, policy_restriction_id)?;
        let request = with_if_match(self.core.request(Method::DELETE, &url), if_match);
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
        policy_restriction_id: &str,
    ) -> Result<Versioned<PolicyRestrictionContract>, ArmError> {
        let url = self.restriction_url(resource_group_name, service_name, policy_restriction_id)?;
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
        policy_restriction_id: &str,
    ) -> Result<EntityTag, ArmError> {
        let url = self.restriction_url(resource_group_name, service_name, policy_restriction_id)?;
        self.core.read_entity_tag(&url).await
    }

    pub fn list_by_service(
        &self,
        resource_group_name: &str,
        service_name: &str,
    ) -> Pager<PolicyRestrictionCollection> {
        let first = self
            .core
            .service_url(RESTRICTIONS_PATH, resource_group_name, service_name)
            .build();
        Pager::get_pages(self.core.pipeline.clone(), first)
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        policy_restriction_id: &str,
        if_match: &ETag,
        parameters: &PolicyRestrictionUpdateContract,
    ) -> Result<Versioned<PolicyRestrictionContract>, ArmError> {
        let url = self.restriction_url(resource_group_name, service_name, policy_restriction_id)?;
        let request = self
            .core
            .request(Method::PATCH, &url)
            .header(IF_MATCH, if_match.as_str())
            .json(parameters)?;
        ClientCore::read_entity(&Method::PATCH, &url, request, &[StatusCode::OK]).await
    }
}
