use std::sync::Arc;

use armkit_identity::TokenCredential;
use armkit_runtime::{ArmError, ClientOptions, ETag, IF_MATCH, Pager, UrlTemplate};
use http::{Method, StatusCode};

use super::{API_VERSION, ClientCore, with_if_match};
use crate::models::{PolicyCollection, PolicyContract, PolicyIdName};
use crate::options::ProductPolicyGetOptions;
use crate::response::{EntityTag, Versioned};

const POLICY_PATH: &str = service_path!("/products/{productId}/policies/{policyId}");
const POLICIES_PATH: &str = service_path!("/products/{productId}/policies");

/// The policy document of a product.
#[derive(Clone, Debug)]
pub struct ProductPolicyClient {
    core: ClientCore,
}

impl ProductPolicyClient {
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

    fn policy_url(
        &self,
        resource_group_name: &str,
        service_name: &str,
        product_id: &str,
        policy_id: PolicyIdName,
    ) -> UrlTemplate {
        self.core
            .service_url(POLICY_PATH, resource_group_name, service_name)
            .path_param("productId", product_id)
            .path_param("policyId", policy_id.as_str())
    }

    /// # Errors
    /// Empty identifiers, transport failures, or any status but 200/201.
    #[tracing::instrument(skip(self, parameters))]
    pub async fn create_or_update(
        &self,
        resource_group_name: &str,
        service_name: &str,
        product_id: &str,
        policy_id: PolicyIdName,
        parameters: &PolicyContract,
        if_match: Option<&ETag>,
    ) -> Result<Versioned<PolicyContract>, ArmError> {
        let url = self
            .policy_url(resource_group_name, service_name, product_id, policy_id)
            .build()?;
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
        product_id: &str,
        policy_id: PolicyIdName,
        if_match: &ETag,
    ) -> Result<(), ArmError> {
        let url = self
            .policy_url(resource_group_name, service_name, product_id, policy_id)
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
        product_id: &str,
        policy_id: PolicyIdName,
        options: &ProductPolicyGetOptions,
    ) -> Result<Versioned<PolicyContract>, ArmError> {
        let url = self
            .policy_url(resource_group_name, service_name, product_id, policy_id)
            .query_opt("format", options.format.as_ref())
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
        product_id: &str,
        policy_id: PolicyIdName,
    ) -> Result<EntityTag, ArmError> {
        let url = self
            .policy_url(resource_group_name, service_name, product_id, policy_id)
            .build()?;
        self.core.read_entity_tag(&url).await
    }

    pub fn list_by_product(
        &self,
        resource_group_name: &str,
        service_name: &str,
        product_id: &str,
    ) -> Pager<PolicyCollection> {
        let first = self
            .core
            .service_url(POLICIES_PATH, resource_group_name, service_name)
            .path_param("productId", product_id)
            .build();
        Pager::get_pages(self.core.pipeline.clone(), first)
    }
}
