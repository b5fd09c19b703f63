use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::CredentialError;
use crate::secret::SecretString;

/// Public-cloud Microsoft Entra ID authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Settings for [`ClientSecretCredential`](crate::ClientSecretCredential).
///
/// `Debug` redacts `client_secret`.
#[derive(Clone)]
pub struct ClientSecretConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,

    /// Authority base URL (default: [`DEFAULT_AUTHORITY_HOST`])
    pub authority_host: Url,

    /// Refresh this long before expiry (default: 5 min)
    pub refresh_offset: Duration,

    /// Random early refresh, up to this much (default: 30 s)
    pub jitter_max: Duration,

    /// Floor between refresh attempts after failures (default: 10 s)
    pub min_refresh_period: Duration,

    /// Lifetime assumed when the endpoint omits `expires_in` (default: 1 h)
    pub default_ttl: Duration,

    /// `None` uses [`HttpClientConfig::token_endpoint`](armkit_http::HttpClientConfig::token_endpoint)
    pub http_config: Option<armkit_http::HttpClientConfig>,
}

impl ClientSecretConfig {
    /// # Errors
    /// [`CredentialError::Config`] if `authority_host` is not a valid URL.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret,
            authority_host: parse_authority(DEFAULT_AUTHORITY_HOST)?,
            refresh_offset: Duration::from_secs(5 * 60),
            jitter_max: Duration::from_secs(30),
            min_refresh_period: Duration::from_secs(10),
            default_ttl: Duration::from_secs(3600),
            http_config: None,
        })
    }

    /// # Errors
    /// [`CredentialError::Config`] if `host` is not an absolute URL.
    pub fn with_authority_host(mut self, host: &str) -> Result<Self, CredentialError> {
        self.authority_host = parse_authority(host)?;
        Ok(self)
    }

    /// # Errors
    /// [`CredentialError::Config`] naming the first empty or malformed field.
    pub fn validate(&self) -> Result<(), CredentialError> {
        if self.tenant_id.trim().is_empty() {
            return Err(CredentialError::Config("tenant_id must not be empty".into()));
        }
        if !self
            .tenant_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        {
            return Err(CredentialError::Config(format!(
                "tenant_id '{}' contains invalid characters",
                self.tenant_id
            )));
        }
        if self.client_id.trim().is_empty() {
            return Err(CredentialError::Config("client_id must not be empty".into()));
        }
        if self.client_secret.is_empty() {
            return Err(CredentialError::Config(
                "client_secret must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// `{authority_host}/{tenant_id}/oauth2/v2.0/token`
    ///
    /// # Errors
    /// [`CredentialError::Config`] if the joined URL is invalid.
    pub fn token_endpoint(&self) -> Result<Url, CredentialError> {
        let mut base = self.authority_host.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&format!("{}/oauth2/v2.0/token", self.tenant_id))
            .map_err(|e| CredentialError::Config(format!("invalid token endpoint: {e}")))
    }
}

fn parse_authority(host: &str) -> Result<Url, CredentialError> {
    Url::parse(host)
        .map_err(|e| CredentialError::Config(format!("invalid authority host '{host}': {e}")))
}

impl fmt::Debug for ClientSecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("authority_host", &self.authority_host.as_str())
            .field("refresh_offset", &self.refresh_offset)
            .field("jitter_max", &self.jitter_max)
            .field("min_refresh_period", &self.min_refresh_period)
            .field("default_ttl", &self.default_ttl)
            .field("http_config", &self.http_config)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn config() -> ClientSecretConfig {
        ClientSecretConfig::new(
            "72f988bf-86f1-41af-91ab-2d7cd011db47",
            "app-id",
            SecretString::new("s3cret"),
        )
        .unwrap()
    }

    #[test]
    fn test_token_endpoint_public_cloud() {
        assert_eq!(
            config().token_endpoint().unwrap().as_str(),
            "https://login.microsoftonline.com/72f988bf-86f1-41af-91ab-2d7cd011db47/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_token_endpoint_custom_authority_with_path() {
        let cfg = config()
            .with_authority_host("http://localhost:8080/aad")
            .unwrap();
        assert_eq!(
            cfg.token_endpoint().unwrap().as_str(),
            "http://localhost:8080/aad/72f988bf-86f1-41af-91ab-2d7cd011db47/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut cfg = config();
        cfg.client_secret = SecretString::new("");
        assert!(matches!(cfg.validate(), Err(CredentialError::Config(m)) if m.contains("client_secret")));

        let mut cfg = config();
        cfg.tenant_id = " ".into();
        assert!(matches!(cfg.validate(), Err(CredentialError::Config(m)) if m.contains("tenant_id")));
    }

    #[test]
    fn test_validate_rejects_path_characters_in_tenant() {
        let mut cfg = config();
        cfg.tenant_id = "../common".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let dbg = format!("{:?}", config());
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("s3cret"));
    }

    #[test]
    fn test_invalid_authority_host() {
        assert!(config().with_authority_host("not a url").is_err());
    }
}
