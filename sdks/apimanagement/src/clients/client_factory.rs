use std::sync::Arc;

use armkit_identity::TokenCredential;
use armkit_runtime::{ArmError, ArmPipeline, ClientOptions};

use super::backend::BACKEND_API_VERSION;
use super::{
    API_VERSION, ApiDiagnosticClient, ApiGatewayClient, ApiOperationClient, BackendClient,
    ClientCore, PolicyRestrictionClient, ProductPolicyClient, ReportsClient,
    WorkspaceApiSchemaClient, WorkspaceLoggerClient,
};

/// Builds operation clients that share one pipeline, and with it one
/// connection pool and one token cache.
///
/// ```no_run
/// # use std::sync::Arc;
/// # fn demo(credential: Arc<dyn armkit_identity::TokenCredential>) -> Result<(), armkit_runtime::ArmError> {
/// let options = armkit_runtime::ClientOptions::default();
/// let factory = armapimanagement::ClientFactory::new("00000000-0000-0000-0000-000000000000", credential, &options)?;
/// let backends = factory.backend_client();
/// let loggers = factory.workspace_logger_client();
/// # let _ = (backends, loggers);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ClientFactory {
    subscription_id: String,
    pipeline: ArmPipeline,
}

impl ClientFactory {
    /// # Errors
    /// When the pipeline cannot be built from `options`.
    pub fn new(
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
        options: &ClientOptions,
    ) -> Result<Self, ArmError> {
        Ok(Self {
            subscription_id: subscription_id.into(),
            pipeline: ArmPipeline::new(credential, options)?,
        })
    }

    #[must_use]
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn core(&self, api_version: &'static str) -> ClientCore {
        ClientCore::new(
            self.subscription_id.clone(),
            self.pipeline.clone(),
            api_version,
        )
    }

    #[must_use]
    pub fn api_diagnostic_client(&self) -> ApiDiagnosticClient {
        ApiDiagnosticClient::from_core(self.core(API_VERSION))
    }

    #[must_use]
    pub fn api_gateway_client(&self) -> ApiGatewayClient {
        ApiGatewayClient::from_core(self.core(API_VERSION))
    }

    #[must_use]
    pub fn api_operation_client(&self) -> ApiOperationClient {
        ApiOperationClient::from_core(self.core(API_VERSION))
    }

    #[must_use]
    pub fn backend_client(&self) -> BackendClient {
        BackendClient::from_core(self.core(BACKEND_API_VERSION))
    }

    #[must_use]
    pub fn policy_restriction_client(&self) -> PolicyRestrictionClient {
        PolicyRestrictionClient::from_core(self.core(API_VERSION))
    }

    #[must_use]
    pub fn product_policy_client(&self) -> ProductPolicyClient {
        ProductPolicyClient::from_core(self.core(API_VERSION))
    }

    #[must_use]
    pub fn reports_client(&self) -> ReportsClient {
        ReportsClient::from_core(self.core(API_VERSION))
    }

    #[must_use]
    pub fn workspace_api_schema_client(&self) -> WorkspaceApiSchemaClient {
        WorkspaceApiSchemaClient::from_core(self.core(API_VERSION))
    }

    #[must_use]
    pub fn workspace_logger_client(&self) -> WorkspaceLoggerClient {
        WorkspaceLoggerClient::from_core(self.core(API_VERSION))
    }
}
