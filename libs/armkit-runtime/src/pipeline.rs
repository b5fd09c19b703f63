use std::sync::Arc;
use std::time::Duration;

use armkit_http::{HttpClient, HttpClientBuilder, RequestBuilder};
use armkit_identity::TokenCredential;
use http::Method;
use tower::Layer;
use tower::util::BoxCloneService;
use url::Url;

use crate::error::ArmError;
use crate::options::ClientOptions;
use crate::policy::BearerTokenLayer;
use crate::url_template::UrlTemplate;

/// Authorized HTTP pipeline shared by every operation client.
///
/// Cheap to clone; clones share the connection pool and token cache.
#[derive(Clone)]
pub struct ArmPipeline {
    client: HttpClient,
    endpoint: String,
    api_version: Option<String>,
    poll_frequency: Duration,
}

impl ArmPipeline {
    /// # Errors
    /// [`ArmError::InvalidUrl`] for an unusable endpoint, [`ArmError::Http`]
    /// when the transport cannot be built.
    pub fn new(
        credential: Arc<dyn TokenCredential>,
        options: &ClientOptions,
    ) -> Result<Self, ArmError> {
        let endpoint = options.resource_manager_endpoint();
        let parsed = Url::parse(&endpoint)
            .map_err(|e| ArmError::InvalidUrl(format!("endpoint {endpoint}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ArmError::InvalidUrl(format!(
                "endpoint {endpoint} is not a base URL"
            )));
        }

        let auth = BearerTokenLayer::new(credential, vec![options.token_scope()])
            .allow_insecure(options.http.allow_insecure_http);
        let client = HttpClientBuilder::with_config(options.http_client_config())
            .with_auth_layer(move |inner| BoxCloneService::new(auth.layer(inner)))
            .build()?;

        tracing::debug!(endpoint = %endpoint, cloud = ?options.cloud, "ARM pipeline ready");

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            api_version: options.api_version.clone(),
            poll_frequency: options.poll_frequency,
        })
    }

    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured override, else `default`.
    #[must_use]
    pub fn api_version<'a>(&'a self, default: &'a str) -> &'a str {
        self.api_version.as_deref().unwrap_or(default)
    }

    #[must_use]
    pub fn poll_frequency(&self) -> Duration {
        self.poll_frequency
    }

    pub fn url(&self, path: &str) -> UrlTemplate {
        UrlTemplate::new(&self.endpoint, path)
    }

    /// Request with `Accept: application/json`.
    pub fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        self.client
            .request(method, url.as_str())
            .header("accept", "application/json")
    }
}

impl std::fmt::Debug for ArmPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmPipeline")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("poll_frequency", &self.poll_frequency)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use armkit_identity::StaticTokenCredential;
    use httpmock::prelude::*;

    fn credential() -> Arc<dyn TokenCredential> {
        Arc::new(StaticTokenCredential::new("pipeline-token"))
    }

    #[tokio::test]
    async fn test_requests_carry_bearer_and_accept() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/subscriptions/s1")
                .header("authorization", "Bearer pipeline-token")
                .header("accept", "application/json")
                .header_exists("x-ms-client-request-id");
            then.status(200);
        });

        let pipeline =
            ArmPipeline::new(credential(), &ClientOptions::for_testing(server.base_url())).unwrap();
        let url = pipeline.url("/subscriptions/s1").build().unwrap();
        let resp = pipeline.request(Method::GET, &url).send().await.unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        m.assert();
    }

    #[tokio::test]
    async fn test_api_version_override() {
        let mut options = ClientOptions::for_testing("http://127.0.0.1:1");
        let pipeline = ArmPipeline::new(credential(), &options).unwrap();
        assert_eq!(pipeline.api_version("2024-05-01"), "2024-05-01");

        options.api_version = Some("2023-09-01-preview".into());
        let pipeline = ArmPipeline::new(credential(), &options).unwrap();
        assert_eq!(pipeline.api_version("2024-05-01"), "2023-09-01-preview");
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let options = ClientOptions::for_testing("mailto:ops@example.test");
        assert!(matches!(
            ArmPipeline::new(credential(), &options),
            Err(ArmError::InvalidUrl(_))
        ));
    }
}
