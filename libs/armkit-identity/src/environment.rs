use async_trait::async_trait;

use crate::client_secret::ClientSecretCredential;
use crate::config::ClientSecretConfig;
use crate::credential::{AccessToken, TokenCredential, TokenRequestOptions};
use crate::error::CredentialError;
use crate::secret::SecretString;

pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";

/// [`ClientSecretCredential`] configured from `AZURE_*` environment variables.
#[derive(Clone, Debug)]
pub struct EnvironmentCredential {
    inner: ClientSecretCredential,
}

impl EnvironmentCredential {
    /// Reads `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET` and
    /// the optional `AZURE_AUTHORITY_HOST`.
    ///
    /// # Errors
    /// [`CredentialError::Config`] naming the first missing variable.
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_env_with(|config| config)
    }

    /// Like [`from_env`](Self::from_env), letting the caller adjust the config
    /// (HTTP settings, refresh policy) before the credential is built.
    ///
    /// # Errors
    /// As [`from_env`](Self::from_env).
    pub fn from_env_with(
        customize: impl FnOnce(ClientSecretConfig) -> ClientSecretConfig,
    ) -> Result<Self, CredentialError> {
        let tenant_id = required(AZURE_TENANT_ID)?;
        let client_id = required(AZURE_CLIENT_ID)?;
        let secret = SecretString::new(required(AZURE_CLIENT_SECRET)?);

        let mut config = ClientSecretConfig::new(tenant_id, client_id, secret)?;
        if let Some(host) = optional(AZURE_AUTHORITY_HOST) {
            config = config.with_authority_host(&host)?;
        }
        tracing::debug!(
            tenant_id = %config.tenant_id,
            client_id = %config.client_id,
            authority = %config.authority_host,
            "using environment credential"
        );

        Ok(Self {
            inner: ClientSecretCredential::new(customize(config))?,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &str) -> Result<String, CredentialError> {
    optional(name)
        .ok_or_else(|| CredentialError::Config(format!("environment variable {name} is not set")))
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    async fn get_token(
        &self,
        options: &TokenRequestOptions,
    ) -> Result<AccessToken, CredentialError> {
        self.inner.get_token(options).await
    }

    fn invalidate(&self) {
        self.inner.invalidate();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_missing_variable_is_named() {
        temp_env::with_vars(
            [
                (AZURE_TENANT_ID, Some("tenant-1")),
                (AZURE_CLIENT_ID, None),
                (AZURE_CLIENT_SECRET, Some("shh")),
            ],
            || {
                let err = EnvironmentCredential::from_env().unwrap_err();
                assert!(
                    matches!(err, CredentialError::Config(ref m) if m.contains(AZURE_CLIENT_ID)),
                    "unexpected error: {err}"
                );
            },
        );
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        temp_env::with_vars(
            [
                (AZURE_TENANT_ID, Some("tenant-1")),
                (AZURE_CLIENT_ID, Some("app-1")),
                (AZURE_CLIENT_SECRET, Some("  ")),
            ],
            || {
                let err = EnvironmentCredential::from_env().unwrap_err();
                assert!(err.to_string().contains(AZURE_CLIENT_SECRET));
            },
        );
    }

    #[tokio::test]
    async fn test_authority_host_from_env() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/tenant-1/oauth2/v2.0/token");
            then.status(200).json_body(serde_json::json!({
                "access_token": "env-token",
                "expires_in": 3600,
                "token_type": "Bearer"
            }));
        });

        let base = server.base_url();
        let cred = temp_env::with_vars(
            [
                (AZURE_TENANT_ID, Some("tenant-1")),
                (AZURE_CLIENT_ID, Some("app-1")),
                (AZURE_CLIENT_SECRET, Some("shh")),
                (AZURE_AUTHORITY_HOST, Some(base.as_str())),
            ],
            || {
                EnvironmentCredential::from_env_with(|mut c| {
                    c.http_config = Some(armkit_http::HttpClientConfig::for_testing());
                    c
                })
                .unwrap()
            },
        );

        let token = cred
            .get_token(&TokenRequestOptions::for_scope(
                "https://management.core.windows.net//.default",
            ))
            .await
            .unwrap();
        mock.assert();
        assert_eq!(token.token.expose(), "env-token");
    }
}
